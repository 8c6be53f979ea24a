//! Public types for the install prompt API
use serde::{Deserialize, Serialize};

/// Query parameters sent by the web UI
#[derive(Debug, Default, Deserialize)]
pub struct InstallPromptQuery {
    /// True when the app is already running from the home screen
    #[serde(default)]
    pub standalone: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallPromptResponse {
    pub show: bool,
    pub dismissed: bool,
}
