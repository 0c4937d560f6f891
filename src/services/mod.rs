pub mod post_service;
pub mod tag_service;
pub mod user_service;

// Re-export services for convenience
pub use post_service::{PostListing, PostService};
pub use tag_service::TagService;
pub use user_service::UserService;
