use std::sync::Arc;

use async_trait::async_trait;
use domain::{DomainError, Post, PostRepository};

use super::document_collection::{repository_error, TypedCollection};
use crate::database::{DocumentStore, Filter, FindOptions, SortOrder};

pub struct DocumentPostRepository {
    posts: TypedCollection<Post>,
}

impl DocumentPostRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            posts: TypedCollection::new(store, "posts"),
        }
    }

    fn newest_first() -> FindOptions {
        FindOptions::sorted_by("createdAt", SortOrder::Descending)
    }
}

#[async_trait]
impl PostRepository for DocumentPostRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, DomainError> {
        self.posts.find_one(Filter::eq("_id", id)).await.map_err(repository_error)
    }

    async fn find_by_author_id(&self, author_id: &str) -> Result<Vec<Post>, DomainError> {
        self.posts
            .find_many(Filter::eq("authorId", author_id), Self::newest_first())
            .await
            .map_err(repository_error)
    }

    async fn find_by_hashtag(&self, hashtag: &str) -> Result<Vec<Post>, DomainError> {
        self.posts
            .find_many(Filter::eq("hashtags", hashtag), Self::newest_first())
            .await
            .map_err(repository_error)
    }

    async fn save(&self, post: &Post) -> Result<Post, DomainError> {
        self.posts.insert(post).await.map_err(repository_error)?;
        Ok(post.clone())
    }

    async fn update(&self, post: &Post) -> Result<Post, DomainError> {
        if !self.posts.replace(post.id(), post).await.map_err(repository_error)? {
            return Err(DomainError::PostNotFound(post.id().to_string()));
        }
        Ok(post.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(repository_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryDocumentStore;

    #[tokio::test]
    async fn finds_posts_by_hashtag_member() {
        let repo = DocumentPostRepository::new(Arc::new(InMemoryDocumentStore::new()));
        repo.save(&Post::new("p1", "u1", "Learning #Rust today").unwrap())
            .await
            .unwrap();
        repo.save(&Post::new("p2", "u1", "Nothing tagged").unwrap())
            .await
            .unwrap();

        let tagged = repo.find_by_hashtag("rust").await.unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].id(), "p1");
        assert_eq!(repo.find_by_author_id("u1").await.unwrap().len(), 2);
    }
}
