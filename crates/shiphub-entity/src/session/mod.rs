//! Session domain entities.

pub mod credentials;
pub mod state;

pub use credentials::StoredCredentials;
pub use state::AuthState;
