pub mod follow_service;
pub mod password_hasher;
pub mod post_service;
pub mod user_service;

pub use follow_service::FollowService;
pub use password_hasher::PasswordHasher;
pub use post_service::PostService;
pub use user_service::UserService;

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
