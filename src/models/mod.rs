pub mod entry;
pub mod mood;
pub mod sleep;
