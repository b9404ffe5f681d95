//! In-app notification feed and the coordinator that fills it.

pub mod coordinator;
pub mod formatter;
pub mod platform;
pub mod store;
