pub mod export;
pub mod markdown;
pub mod summary;
