pub mod config;
pub mod features;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod tokens;
