//! Durable storage keys used by the session logic.
//!
//! Both keys are written together and cleared together; finding only one
//! of them means the stored session is corrupt.

/// Token+role pair, also read by request-routing layers.
pub const CREDENTIALS: &str = "shiphub:auth:credentials";

/// Serialized user record.
pub const USER: &str = "shiphub:auth:user";

/// Every key owned by the session logic.
pub const SESSION_KEYS: [&str; 2] = [CREDENTIALS, USER];
