//! Durable session persistence on the local filesystem.

use std::path::PathBuf;

use crate::error::ClientError;
use crate::providers::CredentialStore;
use crate::state::StoredSession;

/// [`CredentialStore`] backed by one JSON file.
///
/// The whole record is rewritten on every save; there is no partial
/// update and no history.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store writing to `path`. Parent directories are created
    /// on first save.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn storage_error(context: &str, err: &std::io::Error) -> ClientError {
    ClientError::Storage {
        message: format!("{context}: {err}"),
    }
}

impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error("Failed to read session file", &err)),
        };

        let session = serde_json::from_slice(&bytes).map_err(|err| ClientError::Storage {
            message: format!("Corrupt session file: {err}"),
        })?;

        Ok(Some(session))
    }

    async fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|err| storage_error("Failed to create session directory", &err))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(session).map_err(|err| ClientError::Storage {
            message: format!("Failed to serialize session: {err}"),
        })?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|err| storage_error("Failed to write session file", &err))
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error("Failed to remove session file", &err)),
        }
    }
}
