use crate::entities::User;
use crate::errors::DomainError;
use crate::repositories::UserRepository;
use crate::services::{new_id, PasswordHasher};
use std::sync::Arc;

/// User Service - registration and profile changes
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Register a new user; username and email must both be unused.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        if password.trim().is_empty() {
            return Err(DomainError::validation(
                "Password cannot be null or whitespace",
            ));
        }

        // Validate before touching the repository
        User::validate_username(username)?;
        User::validate_email(email)?;

        if self.user_repository.find_by_username(username).await?.is_some() {
            return Err(DomainError::UsernameAlreadyExists(username.to_string()));
        }

        if self.user_repository.find_by_email(email).await?.is_some() {
            return Err(DomainError::EmailAlreadyExists(email.to_string()));
        }

        let password_hash = self.password_hasher.hash(password)?;
        let user = User::new(new_id(), username, email, password_hash)?;

        self.user_repository.save(&user).await
    }

    /// Returns the user when the credentials match.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, DomainError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Ok(None);
        }

        let user = match self.user_repository.find_by_email(email).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        if self.password_hasher.verify(password, user.password_hash()) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<User, DomainError> {
        match self.user_repository.find_by_id(id).await? {
            Some(user) => Ok(user),
            None => Err(DomainError::UserNotFound(id.to_string())),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.user_repository.find_by_username(username).await
    }

    pub async fn update_profile(
        &self,
        id: &str,
        bio: Option<String>,
        profile_picture_url: Option<String>,
    ) -> Result<User, DomainError> {
        let mut user = self.get_user_by_id(id).await?;
        user.update_bio(bio)?;
        user.update_profile_picture(profile_picture_url);

        self.user_repository.update(&user).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        // Check if user exists
        self.get_user_by_id(id).await?;

        self.user_repository.delete(id).await
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, DomainError> {
        self.user_repository.find_all().await
    }
}
