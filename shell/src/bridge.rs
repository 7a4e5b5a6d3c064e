//! Filesystem bridge used for history persistence.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Bridge error type. Callers branch on [`BridgeError::is_not_found`].
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("File or directory not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BridgeError {
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Async access to the host filesystem, keyed by path.
#[async_trait]
pub trait PersistenceBridge: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<String, BridgeError>;

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), BridgeError>;

    /// Create a directory and any missing parents.
    async fn create_directory(&self, path: &Path) -> Result<(), BridgeError>;
}

/// Bridge backed by `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBridge;

#[async_trait]
impl PersistenceBridge for FsBridge {
    async fn read_file(&self, path: &Path) -> Result<String, BridgeError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BridgeError::from_io(path, e))
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), BridgeError> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| BridgeError::from_io(path, e))
    }

    async fn create_directory(&self, path: &Path) -> Result<(), BridgeError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| BridgeError::from_io(path, e))
    }
}
