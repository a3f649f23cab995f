//! Remote config publishing boundary.
//!
//! Publishing writes the tree JSON under one key of a key/value config store.
//! The [`Publisher`] refuses to write without server credentials; the store
//! itself is a trait so the host can plug in the real service.
//!
//! Two stores ship with the crate: [`MemoryConfigStore`] for tests and
//! [`DirectoryConfigStore`], which keeps one `<key>.json` file per key and
//! writes through a temporary file and a rename.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use builder_tree::DesignTree;

use crate::error::RemoteError;
use crate::json;

/// Key used when none is configured.
pub const DEFAULT_KEY: &str = "compose_design";

/// Environment variables holding the credentials.
pub const ENV_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const ENV_CLIENT_EMAIL: &str = "FIREBASE_CLIENT_EMAIL";
pub const ENV_PRIVATE_KEY: &str = "FIREBASE_PRIVATE_KEY";

/// Service account credentials for the config service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCredentials {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
}

impl fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServerCredentials {
    /// Build credentials, turning escaped `\n` sequences in the key (as
    /// stored in single-line env files) into newlines.
    pub fn new(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            client_email: client_email.into(),
            private_key: private_key.into().replace("\\n", "\n"),
        }
    }

    /// Read credentials from the environment. `None` unless all three
    /// variables are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self::new(
            var(ENV_PROJECT_ID)?,
            var(ENV_CLIENT_EMAIL)?,
            var(ENV_PRIVATE_KEY)?,
        ))
    }

    pub fn validate(&self) -> Result<(), RemoteError> {
        let invalid = |field: &'static str, reason: &str| RemoteError::InvalidCredentials {
            field,
            reason: reason.to_string(),
        };
        if self.project_id.trim().is_empty() {
            return Err(invalid("project_id", "is empty"));
        }
        if !self.client_email.contains('@') {
            return Err(invalid("client_email", "is not an email address"));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(invalid("private_key", "is not a PEM private key"));
        }
        Ok(())
    }
}

/// Key/value config store.
pub trait RemoteConfigStore {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Current value under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, RemoteError>;

    /// Replace the value under `key`.
    fn put(&self, key: &str, value: &str) -> Result<(), RemoteError>;

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>, RemoteError>;
}

/// Config keys follow the remote config parameter rules.
pub fn validate_key(key: &str) -> Result<(), RemoteError> {
    let valid = !key.is_empty()
        && key.len() <= 256
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RemoteError::InvalidKey(key.to_string()))
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(&self) -> RemoteError {
        RemoteError::Store {
            store: self.name().to_string(),
            message: "lock poisoned".to_string(),
        }
    }
}

impl RemoteConfigStore for MemoryConfigStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        let values = self.values.read().map_err(|_| self.poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        let mut values = self.values.write().map_err(|_| self.poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, RemoteError> {
        let values = self.values.read().map_err(|_| self.poisoned())?;
        Ok(values.keys().cloned().collect())
    }
}

/// Store keeping one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryConfigStore {
    dir: PathBuf,
}

impl DirectoryConfigStore {
    /// The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl RemoteConfigStore for DirectoryConfigStore {
    fn name(&self) -> &str {
        "directory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        validate_key(key)?;
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path(key);
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "config value written");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, RemoteError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub key: String,
    pub store: String,
    pub bytes: usize,
}

/// Publishes designs to a config store.
pub struct Publisher<'s> {
    store: &'s dyn RemoteConfigStore,
    credentials: Option<ServerCredentials>,
}

impl<'s> Publisher<'s> {
    pub fn new(store: &'s dyn RemoteConfigStore, credentials: Option<ServerCredentials>) -> Self {
        Self { store, credentials }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Write the tree JSON under `key`. Nothing is written without valid
    /// credentials.
    pub fn publish(&self, tree: &DesignTree, key: &str) -> Result<PublishReceipt, RemoteError> {
        let Some(credentials) = &self.credentials else {
            warn!(key, "publish refused: no server credentials");
            return Err(RemoteError::MissingCredentials);
        };
        credentials.validate()?;
        validate_key(key)?;

        let value = json::to_json_string(tree)?;
        self.store.put(key, &value)?;
        info!(
            key,
            store = self.store.name(),
            project = %credentials.project_id,
            bytes = value.len(),
            "design published"
        );
        Ok(PublishReceipt {
            key: key.to_string(),
            store: self.store.name().to_string(),
            bytes: value.len(),
        })
    }

    /// Read back a published design.
    pub fn fetch(&self, key: &str) -> Result<Option<DesignTree>, RemoteError> {
        validate_key(key)?;
        match self.store.get(key)? {
            Some(text) => Ok(Some(json::import_tree(&text)?)),
            None => Ok(None),
        }
    }
}
