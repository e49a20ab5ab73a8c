use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::erp::OdooConfig;
use crate::pipeline::{DEFAULT_ASSISTANT_MODEL, DEFAULT_ASSISTANT_URL};

/// Application-level constants
pub const APP_NAME: &str = "OrderIntake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "Order Intake";

/// Listen address when `ORDER_INTAKE_BIND` is unset.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Timeout for assistant calls. Image orders can take a while.
pub const ASSISTANT_TIMEOUT_SECS: u64 = 120;

/// Timeout for ERP calls.
pub const ERP_TIMEOUT_SECS: u64 = 30;

const CORRECTIONS_FILE: &str = "corrections.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {var} value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot determine a data directory; set ORDER_INTAKE_DATA_DIR")]
    NoDataDir,
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "order_intake=info,tower_http=info"
}

/// Assistant connection settings.
#[derive(Clone)]
pub struct AssistantSettings {
    pub url: String,
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for AssistantSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantSettings")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    /// `None` when any ODOO_* variable is missing; ERP endpoints are then disabled.
    pub odoo: Option<OdooConfig>,
    /// `None` without `ASSISTANT_API_KEY`; only delimited orders are accepted then.
    pub assistant: Option<AssistantSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("ORDER_INTAKE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "ORDER_INTAKE_BIND",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let data_dir = match get("ORDER_INTAKE_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join(APP_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let odoo = match (get("ODOO_URL"), get("ODOO_DB"), get("ODOO_USER"), get("ODOO_PASS")) {
            (Some(url), Some(database), Some(user), Some(password)) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::Invalid {
                        var: "ODOO_URL",
                        value: url,
                        reason: "must start with http:// or https://".into(),
                    });
                }
                Some(OdooConfig {
                    url,
                    database,
                    user,
                    password,
                })
            }
            _ => None,
        };

        let assistant = get("ASSISTANT_API_KEY").map(|api_key| AssistantSettings {
            url: get("ASSISTANT_URL").unwrap_or_else(|| DEFAULT_ASSISTANT_URL.to_string()),
            api_key,
            model: get("ASSISTANT_MODEL").unwrap_or_else(|| DEFAULT_ASSISTANT_MODEL.to_string()),
        });

        Ok(Self {
            bind,
            data_dir,
            odoo,
            assistant,
        })
    }

    pub fn corrections_path(&self) -> PathBuf {
        self.data_dir.join(CORRECTIONS_FILE)
    }
}
