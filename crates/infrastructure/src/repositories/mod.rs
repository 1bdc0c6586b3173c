mod document_collection;
pub mod document_comment_repository;
pub mod document_follow_repository;
pub mod document_post_repository;
pub mod document_user_repository;

pub use document_comment_repository::DocumentCommentRepository;
pub use document_follow_repository::DocumentFollowRepository;
pub use document_post_repository::DocumentPostRepository;
pub use document_user_repository::DocumentUserRepository;
