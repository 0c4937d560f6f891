pub mod database_retry;
pub mod pagination;
pub mod slug;
