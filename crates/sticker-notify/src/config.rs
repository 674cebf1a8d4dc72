//! Notification configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults where a default makes sense. The gateway credentials have no
//! defaults: without them the notifier is simply not constructed and the
//! shop runs without notifications.

use std::env;

/// WhatsApp gateway configuration.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Admin phone number in international format (e.g. +9725...).
    pub admin_phone: String,

    /// API key for the WhatsApp gateway.
    pub api_key: String,

    /// Gateway endpoint the notice is sent to.
    pub gateway_url: String,

    /// Public base URL of the shop, used to build admin order links.
    pub site_base_url: String,
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `ADMIN_WHATSAPP_NUMBER` (required) - international format, `+` prefix
    /// - `WHATSAPP_API_KEY` (required)
    /// - `WHATSAPP_GATEWAY_URL` (optional)
    /// - `SITE_BASE_URL` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_phone = env::var("ADMIN_WHATSAPP_NUMBER")
            .map_err(|_| ConfigError::MissingRequired("ADMIN_WHATSAPP_NUMBER".to_string()))?;

        let api_key = env::var("WHATSAPP_API_KEY")
            .map_err(|_| ConfigError::MissingRequired("WHATSAPP_API_KEY".to_string()))?;

        let config = NotifyConfig {
            admin_phone,
            api_key,
            gateway_url: env::var("WHATSAPP_GATEWAY_URL")
                .unwrap_or_else(|_| "https://api.callmebot.com/whatsapp.php".to_string()),
            site_base_url: env::var("SITE_BASE_URL")
                .unwrap_or_else(|_| "https://shop.example.com".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates field formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let phone = clean_phone(&self.admin_phone);
        if !phone.starts_with('+') || phone.len() < 8 {
            return Err(ConfigError::InvalidValue("ADMIN_WHATSAPP_NUMBER".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue("WHATSAPP_API_KEY".to_string()));
        }
        Ok(())
    }
}

/// Strips everything but digits and the leading `+` from a phone number.
pub fn clean_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
