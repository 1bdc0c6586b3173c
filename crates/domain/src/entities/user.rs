use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::validation::{decrement, require_max_chars, require_non_blank};
use crate::DomainError;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 50;
pub const BIO_MAX_LENGTH: usize = 500;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Core User entity - represents the business domain
///
/// Fields are private so the follower counters can only move through the
/// increment/decrement operations below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    email: String,
    password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_picture_url: Option<String>,
    created_at: DateTime<Utc>,
    followers_count: u32,
    following_count: u32,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let username = username.into();
        let email = email.into();
        let password_hash = password_hash.into();

        require_non_blank(&id, "Id")?;
        Self::validate_username(&username)?;
        Self::validate_email(&email)?;
        require_non_blank(&password_hash, "Password hash")?;

        Ok(Self {
            id,
            username,
            email,
            password_hash,
            bio: None,
            profile_picture_url: None,
            created_at: Utc::now(),
            followers_count: 0,
            following_count: 0,
        })
    }

    pub fn validate_username(username: &str) -> Result<(), DomainError> {
        require_non_blank(username, "Username")?;
        let length = username.chars().count();
        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
            return Err(DomainError::validation(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
            )));
        }
        Ok(())
    }

    pub fn validate_email(email: &str) -> Result<(), DomainError> {
        require_non_blank(email, "Email")?;
        if !EMAIL_REGEX.is_match(email) {
            return Err(DomainError::validation("Email format is invalid"));
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn profile_picture_url(&self) -> Option<&str> {
        self.profile_picture_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn followers_count(&self) -> u32 {
        self.followers_count
    }

    pub fn following_count(&self) -> u32 {
        self.following_count
    }

    pub fn update_bio(&mut self, bio: Option<String>) -> Result<(), DomainError> {
        if let Some(text) = &bio {
            require_max_chars(text, BIO_MAX_LENGTH, "Bio")?;
        }
        self.bio = bio;
        Ok(())
    }

    pub fn update_profile_picture(&mut self, profile_picture_url: Option<String>) {
        self.profile_picture_url = profile_picture_url;
    }

    pub fn increment_followers_count(&mut self) {
        self.followers_count += 1;
    }

    pub fn decrement_followers_count(&mut self) -> Result<(), DomainError> {
        decrement(&mut self.followers_count, "Followers count")
    }

    pub fn increment_following_count(&mut self) {
        self.following_count += 1;
    }

    pub fn decrement_following_count(&mut self) -> Result<(), DomainError> {
        decrement(&mut self.following_count, "Following count")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("u1", "alice", "alice@example.com", "hash").unwrap()
    }

    #[test]
    fn new_user_starts_with_zero_counts() {
        let user = user();
        assert_eq!(user.id(), "u1");
        assert_eq!(user.username(), "alice");
        assert_eq!(user.followers_count(), 0);
        assert_eq!(user.following_count(), 0);
        assert!(user.bio().is_none());
    }

    #[test]
    fn rejects_blank_required_fields() {
        assert!(matches!(
            User::new(" ", "alice", "alice@example.com", "hash"),
            Err(DomainError::ValidationError(_))
        ));
        assert!(matches!(
            User::new("u1", "alice", "alice@example.com", ""),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn username_length_is_bounded() {
        assert!(User::new("u1", "ab", "a@b.io", "hash").is_err());
        assert!(User::new("u1", "abc", "a@b.io", "hash").is_ok());
        assert!(User::new("u1", "a".repeat(50), "a@b.io", "hash").is_ok());
        assert!(User::new("u1", "a".repeat(51), "a@b.io", "hash").is_err());
    }

    #[test]
    fn email_must_look_like_an_address() {
        for bad in ["plain", "no-domain@", "@example.com", "a b@example.com", "a@example"] {
            let err = User::new("u1", "alice", bad, "hash").unwrap_err();
            assert_eq!(err, DomainError::ValidationError("Email format is invalid".into()));
        }
    }

    #[test]
    fn bio_is_limited_to_500_chars() {
        let mut user = user();
        user.update_bio(Some("hello".into())).unwrap();
        assert_eq!(user.bio(), Some("hello"));

        let err = user.update_bio(Some("x".repeat(501))).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert_eq!(user.bio(), Some("hello"));

        user.update_bio(None).unwrap();
        assert!(user.bio().is_none());
    }

    #[test]
    fn decrementing_zero_counters_fails_and_keeps_zero() {
        let mut user = user();
        assert!(matches!(
            user.decrement_followers_count(),
            Err(DomainError::StateError(_))
        ));
        assert!(matches!(
            user.decrement_following_count(),
            Err(DomainError::StateError(_))
        ));
        assert_eq!(user.followers_count(), 0);
        assert_eq!(user.following_count(), 0);
    }

    #[test]
    fn counters_move_in_both_directions() {
        let mut user = user();
        user.increment_followers_count();
        user.increment_followers_count();
        user.increment_following_count();
        user.decrement_followers_count().unwrap();
        assert_eq!(user.followers_count(), 1);
        assert_eq!(user.following_count(), 1);
    }
}
