//! # shiphub-auth
//!
//! Authentication state and access gating for the ShipHub client.
//!
//! ## Modules
//!
//! - `client` — the upstream auth collaborator (sign-in, durable credentials)
//! - `session` — the session store (login, logout, session restore)
//! - `rbac` — the role guard deciding what a session may render

pub mod client;
pub mod rbac;
pub mod session;

pub use client::{AuthApi, AuthFailure, HttpAuthClient, LoginRequest, SignInResponse};
pub use rbac::{GuardDecision, GuardWatch, RoleGuard};
pub use session::SessionStore;
