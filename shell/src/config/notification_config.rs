//! Runtime configuration of the notification center.

use std::path::PathBuf;

use anyhow::bail;

pub const DATA_DIR_ENV: &str = "NOTIFICATION_DATA_DIR";
pub const HISTORY_FILE_ENV: &str = "NOTIFICATION_HISTORY_FILE";
pub const DEFAULT_HISTORY_FILE: &str = "history.json";

const APP_DIR_NAME: &str = "notification-shell";

/// Where the history lives.
///
/// Defaults: `data_dir` is the platform data directory joined with
/// `notification-shell` (or `./.notification-shell` when the platform has
/// none), `history_file` is `history.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub data_dir: PathBuf,
    pub history_file: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: DEFAULT_HISTORY_FILE.into(),
        }
    }
}

impl NotificationConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            history_file: DEFAULT_HISTORY_FILE.into(),
        }
    }

    /// Load from `.env` and the process environment.
    pub fn load() -> Result<Self, anyhow::Error> {
        super::load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let history_file = match get(HISTORY_FILE_ENV) {
            Some(name) if name.contains(['/', '\\']) => {
                bail!("{HISTORY_FILE_ENV} must be a plain file name, got {name:?}")
            }
            Some(name) => name,
            None => DEFAULT_HISTORY_FILE.into(),
        };

        Ok(Self {
            data_dir,
            history_file,
        })
    }

    /// Full path of the history file.
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR_NAME}")))
}
