pub mod extractor;
pub mod timing;
