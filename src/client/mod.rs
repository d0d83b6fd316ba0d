//! Client-side components for the inventory pages.
//!
//! The stock-update controller and the login form are written against small
//! UI collaborator traits ([`ui`]) and pluggable transports, so the same
//! logic drives a browser binding, a terminal front end or a test double.

pub mod alerts;
pub mod login;
pub mod stock_update;
pub mod transport;
pub mod ui;

use config::{Config, ConfigError, Environment};
use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub use alerts::AlertDismisser;
pub use login::{
    AuthOutcome, Authenticator, Credentials, HttpAuthenticator, Key, LoginFormState,
    LoginFormView, LoginOutcome, PasswordField, PasswordRendering, SimulatedAuthenticator,
};
pub use stock_update::{MedicineId, StockForm, StockUpdateController, SubmitOutcome};
pub use transport::{HttpStockClient, StockTransport};
pub use ui::{
    ActionControl, DismissibleAlert, ModalDialog, Notification, NotificationKind, Notifier,
    ViewRefresher,
};

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No stock form registered for medicine {0}")]
    UnknownForm(MedicineId),

    #[error("Stock update already in progress for medicine {0}")]
    Busy(MedicineId),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Client settings, loaded from `MEDSTOCK_CLIENT__*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Server base URL, e.g. "http://127.0.0.1:3000"
    pub base_url: String,
    /// Delay before refreshing the view after a successful stock update
    pub reload_delay_ms: u64,
    /// Artificial latency of the simulated authenticator
    pub login_delay_ms: u64,
    /// Delay before flash alerts are dismissed
    pub alert_dismiss_ms: u64,
    pub access_token: Option<Secret<String>>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            reload_delay_ms: 500,
            login_delay_ms: 1500,
            alert_dismiss_ms: 5000,
            access_token: None,
        }
    }
}

impl ClientSettings {
    pub fn from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("reload_delay_ms", defaults.reload_delay_ms)?
            .set_default("login_delay_ms", defaults.login_delay_ms)?
            .set_default("alert_dismiss_ms", defaults.alert_dismiss_ms)?
            .add_source(
                Environment::with_prefix("MEDSTOCK_CLIENT")
                    .prefix_separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn alert_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.alert_dismiss_ms)
    }
}
