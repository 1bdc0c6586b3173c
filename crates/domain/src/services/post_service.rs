use crate::entities::{Comment, Post};
use crate::errors::DomainError;
use crate::repositories::{CommentRepository, PostRepository, UserRepository};
use crate::services::new_id;
use std::sync::Arc;

/// Posts and their comment threads
pub struct PostService {
    post_repository: Arc<dyn PostRepository>,
    comment_repository: Arc<dyn CommentRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(
        post_repository: Arc<dyn PostRepository>,
        comment_repository: Arc<dyn CommentRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            post_repository,
            comment_repository,
            user_repository,
        }
    }

    pub async fn create_post(
        &self,
        author_id: &str,
        content: &str,
        image_urls: Vec<String>,
    ) -> Result<Post, DomainError> {
        let mut post = Post::new(new_id(), author_id, content)?;
        post.add_image_urls(image_urls)?;

        self.ensure_user_exists(author_id).await?;
        self.post_repository.save(&post).await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, DomainError> {
        self.post_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::PostNotFound(id.to_string()))
    }

    pub async fn edit_post(&self, id: &str, content: &str) -> Result<Post, DomainError> {
        let mut post = self.get_post(id).await?;
        post.update_content(content)?;
        self.post_repository.update(&post).await
    }

    pub async fn posts_by_author(&self, author_id: &str) -> Result<Vec<Post>, DomainError> {
        self.post_repository.find_by_author_id(author_id).await
    }

    pub async fn posts_by_hashtag(&self, hashtag: &str) -> Result<Vec<Post>, DomainError> {
        let tag = hashtag.trim_start_matches('#').to_lowercase();
        self.post_repository.find_by_hashtag(&tag).await
    }

    pub async fn like_post(&self, id: &str) -> Result<Post, DomainError> {
        let mut post = self.get_post(id).await?;
        post.increment_likes_count();
        self.post_repository.update(&post).await
    }

    pub async fn unlike_post(&self, id: &str) -> Result<Post, DomainError> {
        let mut post = self.get_post(id).await?;
        post.decrement_likes_count()?;
        self.post_repository.update(&post).await
    }

    /// Adds a comment (or a reply when `parent_comment_id` is set) and bumps
    /// the post's comment counter.
    pub async fn add_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
        parent_comment_id: Option<String>,
    ) -> Result<Comment, DomainError> {
        let comment = Comment::new(new_id(), post_id, author_id, content, parent_comment_id)?;

        let mut post = self.get_post(post_id).await?;
        self.ensure_user_exists(author_id).await?;

        if let Some(parent_id) = comment.parent_comment_id() {
            let parent = self
                .comment_repository
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| DomainError::CommentNotFound(parent_id.to_string()))?;
            if parent.post_id() != post_id {
                return Err(DomainError::validation(
                    "Parent comment belongs to a different post",
                ));
            }
        }

        let saved = self.comment_repository.save(&comment).await?;
        post.increment_comments_count();
        self.post_repository.update(&post).await?;

        Ok(saved)
    }

    pub async fn comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>, DomainError> {
        self.comment_repository.find_by_post_id(post_id).await
    }

    pub async fn replies_to(&self, comment_id: &str) -> Result<Vec<Comment>, DomainError> {
        self.comment_repository.find_replies(comment_id).await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), DomainError> {
        let comment = self
            .comment_repository
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::CommentNotFound(comment_id.to_string()))?;

        let mut post = self.get_post(comment.post_id()).await?;
        post.decrement_comments_count()?;

        self.comment_repository.delete(comment_id).await?;
        self.post_repository.update(&post).await?;
        Ok(())
    }

    async fn ensure_user_exists(&self, user_id: &str) -> Result<(), DomainError> {
        match self.user_repository.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::UserNotFound(user_id.to_string())),
        }
    }
}
