//! Platform (OS-level) notifications.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, warn};

use shiphub_core::error::AppError;

/// Platform notification permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    /// Not decided yet; the only state in which a prompt is allowed.
    #[default]
    Default,
    /// Notifications may be shown.
    Granted,
    /// The user refused.
    Denied,
}

impl PermissionState {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            other => Err(AppError::configuration(format!(
                "Unknown notification permission: '{other}'"
            ))),
        }
    }
}

/// Platform notification API.
#[async_trait]
pub trait NotificationPlatform: Send + Sync + fmt::Debug + 'static {
    /// Current permission.
    fn permission(&self) -> PermissionState;

    /// Prompts for permission and returns the outcome.
    async fn request_permission(&self) -> PermissionState;

    /// Shows a notification. Callers check [`Self::permission`] first.
    fn show(&self, title: &str, body: &str);
}

/// Platform that writes notifications to the log.
///
/// A prompt resolves `Default` to `Granted`; decided states never change.
#[derive(Debug)]
pub struct LogPlatform {
    permission: Mutex<PermissionState>,
}

impl LogPlatform {
    /// Creates a platform with the given starting permission.
    pub fn new(permission: PermissionState) -> Self {
        Self {
            permission: Mutex::new(permission),
        }
    }

    /// Creates a platform from the configured permission string, falling
    /// back to `Default` on an unknown value.
    pub fn from_setting(setting: &str) -> Self {
        let permission = setting.parse().unwrap_or_else(|e: AppError| {
            warn!(error = %e, "Falling back to default notification permission");
            PermissionState::Default
        });
        Self::new(permission)
    }
}

#[async_trait]
impl NotificationPlatform for LogPlatform {
    fn permission(&self) -> PermissionState {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> PermissionState {
        let mut permission = self.permission.lock();
        if *permission == PermissionState::Default {
            *permission = PermissionState::Granted;
        }
        *permission
    }

    fn show(&self, title: &str, body: &str) {
        info!(title = %title, body = %body, "Platform notification");
    }
}
