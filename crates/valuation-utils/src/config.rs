//! Application-level settings shared by binaries

use serde::{Deserialize, Serialize};

/// Environment variable selecting the runtime environment
pub const ENVIRONMENT_VAR: &str = "FINANCEBRO_ENV";

/// Main application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "financebro".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl AppConfig {
    /// Build settings, overriding the environment from `FINANCEBRO_ENV`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(environment) = std::env::var(ENVIRONMENT_VAR) {
            let environment = environment.trim();
            if !environment.is_empty() {
                config.environment = environment.to_lowercase();
            }
        }
        tracing::debug!(environment = %config.environment, "Loaded application settings");
        config
    }

    /// Whether the process runs in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production" || self.environment == "prod"
    }
}
