//! Core traits defined in `shiphub-core` and implemented by other crates.

pub mod storage;

pub use storage::{DurableStorage, read_json, write_json};
