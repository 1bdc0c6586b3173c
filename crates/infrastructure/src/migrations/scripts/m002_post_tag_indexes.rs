use async_trait::async_trait;

use super::create_index_safely;
use crate::database::{DocumentStore, IndexModel};
use crate::migrations::{Migration, MigrationError};

/// Indexes the derived hashtag and mention arrays on posts.
pub struct PostTagIndexes;

#[async_trait]
impl Migration for PostTagIndexes {
    fn version(&self) -> &str {
        "002"
    }

    fn description(&self) -> &str {
        "Add indexes on post hashtags and mentions"
    }

    fn name(&self) -> &str {
        "PostTagIndexes"
    }

    async fn up(&self, store: &dyn DocumentStore) -> Result<(), MigrationError> {
        if !store.collection_exists("posts").await? {
            return Err(MigrationError::consistency(
                "Collection posts does not exist; apply migration 001 first",
            ));
        }

        create_index_safely(store, "posts", IndexModel::ascending("hashtags")).await?;
        create_index_safely(store, "posts", IndexModel::ascending("mentions")).await
    }

    async fn down(&self, store: &dyn DocumentStore) -> Result<(), MigrationError> {
        if !store.collection_exists("posts").await? {
            return Ok(());
        }
        store.drop_index("posts", "hashtags_1").await?;
        store.drop_index("posts", "mentions_1").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryDocumentStore;

    #[tokio::test]
    async fn requires_posts_collection() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(
            PostTagIndexes.up(&store).await,
            Err(MigrationError::Consistency(_))
        ));
    }

    #[tokio::test]
    async fn up_and_down() {
        let store = InMemoryDocumentStore::new();
        store.create_index("posts", IndexModel::ascending("authorId")).await.unwrap();

        PostTagIndexes.up(&store).await.unwrap();
        PostTagIndexes.up(&store).await.unwrap();
        assert_eq!(store.list_indexes("posts").await.unwrap().len(), 3);

        PostTagIndexes.down(&store).await.unwrap();
        let remaining = store.list_indexes("posts").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "authorId_1");
    }
}
