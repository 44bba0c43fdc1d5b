pub mod codec;
mod file;

pub use file::{FileStore, DEFAULT_MAX_SPACE_USAGE_BYTES};
