//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ClientResult;
use crate::gateway::GatewayConfig;

/// Terminal identity kept in durable client-local storage
///
/// Survives restarts; the server uses `role` to decide which tenders a
/// terminal may take and `kasa_id` to book them on the right till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalProfile {
    pub role: String,
    pub kasa_id: String,
}

impl Default for TerminalProfile {
    fn default() -> Self {
        Self {
            role: "kasa".to_string(),
            kasa_id: "1".to_string(),
        }
    }
}

impl TerminalProfile {
    /// Load the profile; a missing file yields the default profile
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No terminal profile, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the profile as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> ClientResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!(path = %path.display(), role = %self.role, "Terminal profile saved");
        Ok(())
    }
}

/// Client configuration for one terminal
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8000")
    pub base_url: String,

    /// HTTP request timeout in seconds
    pub timeout: u64,

    /// Terminal role sent with `finalize_payment`
    pub role: String,

    /// Till identifier
    pub kasa_id: String,

    /// Card tenders wait for the integrated card terminal before closing
    pub card_terminal_confirmation: bool,

    /// Reconnection policy handed to the transport
    pub gateway: GatewayConfig,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        let profile = TerminalProfile::default();
        Self {
            base_url: base_url.into(),
            timeout: 30,
            role: profile.role,
            kasa_id: profile.kasa_id,
            card_terminal_confirmation: false,
            gateway: GatewayConfig::default(),
        }
    }

    /// Apply a stored terminal profile
    pub fn with_profile(mut self, profile: TerminalProfile) -> Self {
        self.role = profile.role;
        self.kasa_id = profile.kasa_id;
        self
    }

    /// Set the terminal role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Enable or disable card terminal confirmation
    pub fn with_card_terminal_confirmation(mut self, enabled: bool) -> Self {
        self.card_terminal_confirmation = enabled;
        self
    }

    /// Set the gateway reconnection policy
    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = gateway;
        self
    }

    /// Current terminal profile
    pub fn profile(&self) -> TerminalProfile {
        TerminalProfile {
            role: self.role.clone(),
            kasa_id: self.kasa_id.clone(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}
