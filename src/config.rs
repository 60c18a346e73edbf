use std::path::{Path, PathBuf};

use crate::error::LoadError;

const ENV_DATA: &str = "RUSTY_WRAPPED_DATA";
const ENV_REMOTE: &str = "RUSTY_WRAPPED_REMOTE";
const ENV_REMOTE_URL: &str = "RUSTY_WRAPPED_REMOTE_URL";
const ENV_REMOTE_USER: &str = "RUSTY_WRAPPED_REMOTE_USER";
const ENV_REMOTE_TOKEN: &str = "RUSTY_WRAPPED_REMOTE_TOKEN";
const ENV_REMOTE_PATH: &str = "RUSTY_WRAPPED_REMOTE_PATH";

/// File name looked up next to the executable when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "raw.csv";

// ---------------------------------------------------------------------------
// Data source selection
// ---------------------------------------------------------------------------

/// Credentials and location of the remote copy of the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub base_url: String,
    pub user: String,
    pub token: String,
    /// Content-addressed object path below `base_url`.
    pub path: String,
}

impl RemoteSource {
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Where the startup load reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Local(PathBuf),
    Remote(RemoteSource),
}

impl DataSource {
    /// Short human label for the status bar.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Local(path) => path.display().to_string(),
            DataSource::Remote(remote) => remote.url(),
        }
    }
}

/// Startup configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub local_path: PathBuf,
    /// `Some` when the remote flag is set and every credential is present.
    pub remote: Option<RemoteSource>,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Fails only when the remote flag is on but a credential is missing;
    /// callers decide whether to fall back to [`Config::local_only`].
    pub fn from_env() -> Result<Self, LoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration that ignores the remote flag entirely.
    pub fn local_only() -> Self {
        Config {
            local_path: local_path_from(std::env::var(ENV_DATA).ok()),
            remote: None,
        }
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, LoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let local_path = local_path_from(lookup(ENV_DATA));

        let remote = if lookup(ENV_REMOTE).as_deref().is_some_and(is_truthy) {
            let require = |key: &str| {
                lookup(key)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| LoadError::MissingEnv(key.to_string()))
            };
            Some(RemoteSource {
                base_url: require(ENV_REMOTE_URL)?,
                user: require(ENV_REMOTE_USER)?,
                token: require(ENV_REMOTE_TOKEN)?,
                path: lookup(ENV_REMOTE_PATH)
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()),
            })
        } else {
            None
        };

        Ok(Config { local_path, remote })
    }

    /// The source used for the startup load.
    pub fn source(&self) -> DataSource {
        match &self.remote {
            Some(remote) => DataSource::Remote(remote.clone()),
            None => DataSource::Local(self.local_path.clone()),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn local_path_from(value: Option<String>) -> PathBuf {
    value
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_local_path)
}

/// `raw.csv` beside the running executable, or in the working directory
/// when the executable path cannot be determined.
fn default_local_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(DEFAULT_DATA_FILE)
}
