pub mod comment;
pub mod follow;
pub mod post;
pub mod user;
mod validation;

pub use comment::*;
pub use follow::*;
pub use post::*;
pub use user::*;
