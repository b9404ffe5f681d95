//! # shiphub-core
//!
//! Core crate for the ShipHub client. Contains the configuration schemas,
//! the durable storage trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ShipHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
