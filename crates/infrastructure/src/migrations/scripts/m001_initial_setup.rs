use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::create_index_safely;
use crate::database::{CollectionOptions, DocumentStore, IndexModel};
use crate::migrations::{Migration, MigrationError};

const EXPECTED_COLLECTIONS: [&str; 4] = ["users", "posts", "comments", "follows"];

/// Creates the four core collections with their validators and indexes.
///
/// A database holding all of them only gets its indexes ensured; one holding
/// some but not all is refused.
pub struct InitialSetup;

#[async_trait]
impl Migration for InitialSetup {
    fn version(&self) -> &str {
        "001"
    }

    fn description(&self) -> &str {
        "Initial database setup with collections, schemas, and indexes"
    }

    fn name(&self) -> &str {
        "InitialSetup"
    }

    async fn up(&self, store: &dyn DocumentStore) -> Result<(), MigrationError> {
        let names = store.list_collection_names().await?;
        let existing: Vec<&str> = EXPECTED_COLLECTIONS
            .iter()
            .copied()
            .filter(|expected| names.iter().any(|name| name == expected))
            .collect();

        if existing.len() == EXPECTED_COLLECTIONS.len() {
            info!("Core collections already exist, ensuring indexes");
        } else if existing.is_empty() {
            for (name, validator) in [
                ("users", users_schema()),
                ("posts", posts_schema()),
                ("comments", comments_schema()),
                ("follows", follows_schema()),
            ] {
                store
                    .create_collection(name, CollectionOptions::with_validator(validator))
                    .await?;
            }
        } else {
            return Err(MigrationError::consistency(format!(
                "Database is in an unexpected state. Found collections: {}. \
                 Expected either all collections to exist or none to exist.",
                existing.join(", ")
            )));
        }

        create_indexes(store).await
    }

    async fn down(&self, store: &dyn DocumentStore) -> Result<(), MigrationError> {
        for name in EXPECTED_COLLECTIONS {
            store.drop_collection(name).await?;
        }
        Ok(())
    }
}

async fn create_indexes(store: &dyn DocumentStore) -> Result<(), MigrationError> {
    create_index_safely(store, "users", IndexModel::ascending("username").unique()).await?;
    create_index_safely(store, "users", IndexModel::ascending("email").unique()).await?;

    create_index_safely(store, "posts", IndexModel::ascending("authorId")).await?;
    create_index_safely(store, "posts", IndexModel::descending("createdAt")).await?;

    create_index_safely(store, "comments", IndexModel::ascending("postId")).await?;
    create_index_safely(store, "comments", IndexModel::ascending("authorId")).await?;

    let follow_pair = IndexModel::ascending("followerId")
        .then_ascending("followeeId")
        .unique();
    create_index_safely(store, "follows", follow_pair).await?;
    create_index_safely(store, "follows", IndexModel::ascending("followerId")).await?;
    create_index_safely(store, "follows", IndexModel::ascending("followeeId")).await?;

    Ok(())
}

fn users_schema() -> Value {
    json!({
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["_id", "username", "email", "passwordHash", "createdAt"],
            "properties": {
                "_id": { "bsonType": "string" },
                "username": { "bsonType": "string", "minLength": 3, "maxLength": 50 },
                "email": { "bsonType": "string", "pattern": r"^[^@\s]+@[^@\s]+\.[^@\s]+$" },
                "passwordHash": { "bsonType": "string", "minLength": 1 },
                "bio": { "bsonType": "string", "maxLength": 500 },
                "profilePictureUrl": { "bsonType": "string" },
                "followersCount": { "bsonType": "int", "minimum": 0 },
                "followingCount": { "bsonType": "int", "minimum": 0 },
                "createdAt": { "bsonType": "date" }
            }
        }
    })
}

fn posts_schema() -> Value {
    json!({
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["_id", "authorId", "content", "createdAt"],
            "properties": {
                "_id": { "bsonType": "string" },
                "authorId": { "bsonType": "string" },
                "content": { "bsonType": "string", "minLength": 1, "maxLength": 500 },
                "imageUrls": { "bsonType": "array", "items": { "bsonType": "string" } },
                "hashtags": { "bsonType": "array", "items": { "bsonType": "string" } },
                "mentions": { "bsonType": "array", "items": { "bsonType": "string" } },
                "likesCount": { "bsonType": "int", "minimum": 0 },
                "commentsCount": { "bsonType": "int", "minimum": 0 },
                "createdAt": { "bsonType": "date" },
                "updatedAt": { "bsonType": "date" }
            }
        }
    })
}

fn comments_schema() -> Value {
    json!({
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["_id", "postId", "authorId", "content", "createdAt"],
            "properties": {
                "_id": { "bsonType": "string" },
                "postId": { "bsonType": "string" },
                "authorId": { "bsonType": "string" },
                "content": { "bsonType": "string", "minLength": 1, "maxLength": 1000 },
                "parentCommentId": { "bsonType": "string" },
                "likesCount": { "bsonType": "int", "minimum": 0 },
                "createdAt": { "bsonType": "date" },
                "updatedAt": { "bsonType": "date" }
            }
        }
    })
}

fn follows_schema() -> Value {
    json!({
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["_id", "followerId", "followeeId", "createdAt"],
            "properties": {
                "_id": { "bsonType": "string" },
                "followerId": { "bsonType": "string" },
                "followeeId": { "bsonType": "string" },
                "createdAt": { "bsonType": "date" }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryDocumentStore;
    use crate::errors::StoreError;

    #[tokio::test]
    async fn creates_collections_with_validators_and_indexes() {
        let store = InMemoryDocumentStore::new();
        InitialSetup.up(&store).await.unwrap();

        let names = store.list_collection_names().await.unwrap();
        assert_eq!(names, vec!["comments", "follows", "posts", "users"]);

        let follows: Vec<String> = store
            .list_indexes("follows")
            .await
            .unwrap()
            .into_iter()
            .map(|index| index.name)
            .collect();
        assert!(follows.contains(&"followerId_1_followeeId_1".to_string()));

        let invalid = serde_json::json!({"_id": "u1", "username": "al"});
        assert!(matches!(
            store.insert_one("users", invalid.as_object().cloned().unwrap()).await,
            Err(StoreError::SchemaViolation { .. })
        ));
    }

    #[tokio::test]
    async fn reapplying_only_ensures_indexes() {
        let store = InMemoryDocumentStore::new();
        InitialSetup.up(&store).await.unwrap();
        store.drop_index("users", "email_1").await.unwrap();

        InitialSetup.up(&store).await.unwrap();
        let users = store.list_indexes("users").await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn partial_state_is_refused() {
        let store = InMemoryDocumentStore::new();
        store.create_collection("users", CollectionOptions::default()).await.unwrap();
        store.create_collection("posts", CollectionOptions::default()).await.unwrap();

        let err = InitialSetup.up(&store).await.unwrap_err();
        assert!(matches!(err, MigrationError::Consistency(_)));
        assert!(err.to_string().contains("Found collections: users, posts"));
        assert_eq!(store.list_collection_names().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn down_drops_everything() {
        let store = InMemoryDocumentStore::new();
        InitialSetup.up(&store).await.unwrap();
        InitialSetup.down(&store).await.unwrap();
        assert!(store.list_collection_names().await.unwrap().is_empty());
    }
}
