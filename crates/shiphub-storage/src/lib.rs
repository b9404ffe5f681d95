//! # shiphub-storage
//!
//! Durable client storage for ShipHub. Supports two modes:
//!
//! - **memory**: process-local map, for tests and throwaway sessions
//! - **local**: a single JSON file on disk, surviving restarts
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "local")]
pub mod local;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::StorageManager;
