//! `guard`: evaluate a role guard against the stored session.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use shiphub_auth::{GuardWatch, RoleGuard, SessionStore};
use shiphub_core::result::AppResult;
use shiphub_entity::user::UserRole;

use crate::output::{self, OutputFormat};

/// Arguments for `guard`
#[derive(Debug, Args)]
pub struct GuardArgs {
    /// Allowed roles (e.g. `ADMIN,MERCHANT`)
    #[arg(short, long = "allow", value_delimiter = ',', required = true)]
    pub allow: Vec<String>,
}

/// Guard display row
#[derive(Debug, Serialize, Tabled)]
struct GuardRow {
    /// Allowed roles
    allowed: String,
    /// Decision
    decision: String,
    /// Redirect target
    redirect: String,
}

/// Execute `guard`
pub async fn execute(
    args: &GuardArgs,
    session: &Arc<SessionStore>,
    format: OutputFormat,
) -> AppResult<()> {
    let roles = args
        .allow
        .iter()
        .map(|r| r.parse::<UserRole>())
        .collect::<AppResult<Vec<_>>>()?;

    let guard = RoleGuard::new(roles.iter().copied());
    let watch = GuardWatch::spawn(guard, session.subscribe());
    session.check_auth().await;
    let decision = watch.resolved().await;

    if !decision.is_authorized() {
        output::print_warning(&format!("Access denied: {decision}"));
    }

    let row = GuardRow {
        allowed: roles
            .iter()
            .map(UserRole::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        decision: decision.to_string(),
        redirect: decision.redirect().unwrap_or("-").to_string(),
    };
    output::print_item(&row, format);
    Ok(())
}
