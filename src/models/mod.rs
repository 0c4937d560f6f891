pub mod post;
pub mod tag;
pub mod user;

// Re-export models for convenience
pub use post::Post;
pub use tag::Tag;
pub use user::User;
