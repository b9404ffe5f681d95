//! Client-side session lifecycle: login, logout, restore.

pub mod store;

pub use store::SessionStore;
