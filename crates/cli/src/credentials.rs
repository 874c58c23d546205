//! Saved API key storage and precedence.
//!
//! A key saved by the user always wins; the environment key is only a
//! fallback for when nothing has been saved.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glassybites_core::error::CoreError;
use glassybites_core::types::Credential;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Persistent per-user key storage.
pub trait CredentialStore: Send + Sync {
    /// The saved key, if any.
    fn get(&self) -> Result<Option<Credential>, CredentialError>;

    /// Save `credential`, replacing any previous one.
    fn set(&self, credential: &Credential) -> Result<(), CredentialError>;

    /// Human-readable location, for status output.
    fn describe(&self) -> String;
}

/// Where the active key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Saved,
    Environment,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saved => f.write_str("saved key"),
            Self::Environment => f.write_str("environment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub source: CredentialSource,
}

/// Pick the key to use for this run.
///
/// A blank environment value is ignored.
pub fn resolve_credential(
    store: &dyn CredentialStore,
    env_key: Option<&str>,
) -> Result<Option<ResolvedCredential>, CredentialError> {
    if let Some(credential) = store.get()? {
        return Ok(Some(ResolvedCredential {
            credential,
            source: CredentialSource::Saved,
        }));
    }

    Ok(env_key
        .and_then(|key| Credential::new(key).ok())
        .map(|credential| ResolvedCredential {
            credential,
            source: CredentialSource::Environment,
        }))
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct CredentialsFile {
    api_key: String,
}

/// Stores the key as JSON in a file readable only by the owner.
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

    fn io_error(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<Credential>, CredentialError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let file: CredentialsFile =
            serde_json::from_str(&text).map_err(|source| CredentialError::Parse {
                path: self.path.clone(),
                source,
            })?;

        match Credential::new(&file.api_key) {
            Ok(credential) => Ok(Some(credential)),
            Err(_) => {
                tracing::warn!(path = %self.path.display(), "Ignoring blank saved API key");
                Ok(None)
            }
        }
    }

    fn set(&self, credential: &Credential) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string_pretty(&CredentialsFile {
            api_key: credential.expose().to_string(),
        })
        .map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, body).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }

        tracing::info!(path = %self.path.display(), "Saved API key");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the key in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    saved: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(credential: Credential) -> Self {
        Self {
            saved: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credential>, CredentialError> {
        Ok(self
            .saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn set(&self, credential: &Credential) -> Result<(), CredentialError> {
        *self
            .saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
