//! Session CLI commands: login, logout, status.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use shiphub_auth::SessionStore;
use shiphub_core::error::AppError;
use shiphub_core::result::AppResult;
use shiphub_entity::session::AuthState;

use crate::output::{self, OutputFormat};

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Signed in
    authenticated: bool,
    /// Email
    email: String,
    /// Name
    name: String,
    /// Role
    role: String,
    /// Landing page
    landing: String,
}

impl From<&AuthState> for SessionRow {
    fn from(state: &AuthState) -> Self {
        let user = state.user.as_ref().filter(|_| state.is_authenticated);
        Self {
            authenticated: state.is_authenticated,
            email: user.map(|u| u.email.clone()).unwrap_or_default(),
            name: user.map(|u| u.display_name().to_string()).unwrap_or_default(),
            role: user.map(|u| u.role.to_string()).unwrap_or_default(),
            landing: user
                .map(|u| u.role.landing_path())
                .unwrap_or(shiphub_entity::user::LOGIN_PATH)
                .to_string(),
        }
    }
}

/// Execute `login`
pub async fn login(args: &LoginArgs, session: &SessionStore) -> AppResult<()> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
    };

    let user = session.login(&args.email, &password).await?;

    output::print_success(&format!(
        "Signed in as {} ({}); landing page {}",
        user.display_name(),
        user.role,
        user.role.landing_path()
    ));
    Ok(())
}

/// Execute `logout`
pub async fn logout(session: &SessionStore) -> AppResult<()> {
    session.logout().await;
    output::print_success("Signed out");
    Ok(())
}

/// Execute `status`
pub async fn status(session: &SessionStore, format: OutputFormat) -> AppResult<()> {
    let state = session.check_auth().await;
    if !state.is_authenticated {
        output::print_warning("No active session");
    }
    output::print_item(&SessionRow::from(&state), format);
    Ok(())
}
