pub mod decoder;
pub mod loader;
pub mod types;
