//! Client configuration.
//!
//! Values come from defaults, builder methods, or the environment (after a
//! `.env` file is loaded).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DYNASTY_BACKEND_URL` | `http://localhost:5000` |
//! | `DYNASTY_USE_BACKEND` | `true` |
//! | `DYNASTY_API_TIMEOUT_MS` | `30000` |
//! | `DYNASTY_STORAGE_DIR` | unset (in-memory storage) |
//! | `DYNASTY_LOGIN_PATH` | `/login` |

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:5000";
pub const API_SUFFIX: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Settings shared by the HTTP client, stores and the dashboard facade.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Backend origin without the `/api` suffix. Also used to absolutize
    /// relative image paths.
    pub backend_origin: String,

    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,

    /// When false, every resource is served from local storage ("demo" mode)
    /// and the network is never touched.
    pub use_backend: bool,

    /// Directory for file-backed local storage. `None` keeps storage in memory.
    pub storage_dir: Option<PathBuf>,

    /// Entry point the session guard redirects to after a 401.
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            backend_origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            timeout: DEFAULT_TIMEOUT,
            use_backend: true,
            storage_dir: None,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(backend_origin: impl Into<String>) -> Self {
        ClientConfig {
            backend_origin: trim_origin(&backend_origin.into()),
            ..Default::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    /// Returns `Error::Config` when a variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `Error::Config` when a variable is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(origin) = lookup("DYNASTY_BACKEND_URL") {
            if origin.trim().is_empty() {
                return Err(Error::Config("DYNASTY_BACKEND_URL is empty".to_string()));
            }
            config.backend_origin = trim_origin(&origin);
        }

        if let Some(flag) = lookup("DYNASTY_USE_BACKEND") {
            config.use_backend = parse_flag(&flag).ok_or_else(|| {
                Error::Config(format!("DYNASTY_USE_BACKEND must be a boolean, got {}", flag))
            })?;
        }

        if let Some(ms) = lookup("DYNASTY_API_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                Error::Config(format!("DYNASTY_API_TIMEOUT_MS must be an integer, got {}", ms))
            })?;
            config.timeout = Duration::from_millis(ms);
        }

        if let Some(dir) = lookup("DYNASTY_STORAGE_DIR") {
            if !dir.trim().is_empty() {
                config.storage_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(path) = lookup("DYNASTY_LOGIN_PATH") {
            config.login_path = path;
        }

        debug!(
            "Loaded client config: origin={} use_backend={} timeout={:?}",
            config.backend_origin, config.use_backend, config.timeout
        );

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backend(mut self, enabled: bool) -> Self {
        self.use_backend = enabled;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// REST base URL: origin plus the fixed `/api` suffix.
    pub fn api_base_url(&self) -> String {
        format!("{}{}", self.backend_origin, API_SUFFIX)
    }
}

fn trim_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
