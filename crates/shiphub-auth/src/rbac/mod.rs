//! Role-based route guarding.
//!
//! [`RoleGuard`] is a pure decision over an [`AuthState`] snapshot;
//! [`GuardWatch`] keeps a decision current as the session changes.
//!
//! [`AuthState`]: shiphub_entity::session::AuthState

pub mod guard;
pub mod watch;

pub use guard::{GuardDecision, RoleGuard};
pub use watch::GuardWatch;
