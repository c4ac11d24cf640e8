//! OAuth token storage.
//!
//! The cache is read-then-refresh-then-write. Writes go through a temp file
//! and rename so a crash never leaves a torn token behind, but two concurrent
//! invocations can still race and one refresh will win.

use std::path::{Path, PathBuf};

use super::{GoogleApiError, GoogleToken};

/// Where the cached OAuth token lives.
pub trait CredentialStore: Send + Sync {
    /// Load the cached token. `TokenNotFound` when nothing is cached yet.
    fn load(&self) -> Result<GoogleToken, GoogleApiError>;

    /// Persist a token, replacing whatever was cached.
    fn save(&self, token: &GoogleToken) -> Result<(), GoogleApiError>;

    /// Remove the cached token. Missing tokens are not an error.
    fn delete(&self) -> Result<(), GoogleApiError>;
}

/// Token cache backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<GoogleToken, GoogleApiError> {
        if !self.path.exists() {
            return Err(GoogleApiError::TokenNotFound(self.path.clone()));
        }
        let content = std::fs::read_to_string(&self.path)?;
        let token: GoogleToken = serde_json::from_str(&content)?;
        Ok(token)
    }

    fn save(&self, token: &GoogleToken) -> Result<(), GoogleApiError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
                }
            }
        }

        let content = serde_json::to_string_pretty(token)?;
        crate::util::atomic_write_str(&self.path, &content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        log::debug!("Saved OAuth token to {}", self.path.display());
        Ok(())
    }

    fn delete(&self) -> Result<(), GoogleApiError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
