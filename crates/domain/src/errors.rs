use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid state: {0}")]
    StateError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found with id: {0}")]
    UserNotFound(String),

    #[error("Post not found with id: {0}")]
    PostNotFound(String),

    #[error("Comment not found with id: {0}")]
    CommentNotFound(String),

    #[error("Username already taken: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already registered: {0}")]
    EmailAlreadyExists(String),

    #[error("User {0} already follows {1}")]
    AlreadyFollowing(String, String),

    #[error("User {0} does not follow {1}")]
    NotFollowing(String, String),

    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl DomainError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DomainError::ValidationError(message.into())
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        DomainError::StateError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn error_display_includes_context() {
        let e = DomainError::ValidationError("Username cannot be empty".into());
        assert_eq!(e.to_string(), "Validation error: Username cannot be empty");

        let e = DomainError::StateError("Likes count cannot be negative".into());
        assert_eq!(e.to_string(), "Invalid state: Likes count cannot be negative");

        let e = DomainError::AlreadyFollowing("u1".into(), "u2".into());
        assert_eq!(e.to_string(), "User u1 already follows u2");
    }
}
