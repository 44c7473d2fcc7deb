//! JSON file-backed bot store.

use crate::error::StoreError;
use crate::types::StorageData;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Whole-file JSON store for counters, aliases and user lists.
///
/// Every mutation rewrites the full file while holding the write lock, so
/// the file always matches a state the store actually passed through.
pub struct JsonStore {
    path: PathBuf,
    data: RwLock<StorageData>,
}

impl JsonStore {
    /// Load the store from `path`.
    ///
    /// A missing file is created with defaults and written immediately. A
    /// file that fails to parse is logged and replaced by defaults in
    /// memory; it is only overwritten by the next save.
    #[instrument]
    pub async fn open(path: impl Into<PathBuf> + std::fmt::Debug) -> Result<Self, StoreError> {
        let path = path.into();

        let data = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<StorageData>(&bytes) {
                Ok(data) => {
                    info!(
                        "Loaded store from {:?} ({} aliases, {} friends, {} blacklisted)",
                        path,
                        data.aliases.len(),
                        data.friends_list.len(),
                        data.blacklist.len()
                    );
                    data
                }
                Err(e) => {
                    warn!("Invalid store file {:?}: {}; starting empty", path, e);
                    StorageData::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let data = StorageData::default();
                write_json_atomic(&path, &data).await?;
                info!("Created new store at {:?}", path);
                data
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the current state to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let data = self.data.read().await;
        write_json_atomic(&self.path, &*data).await
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> StorageData {
        self.data.read().await.clone()
    }

    /// Command an alias points to. `alias` is matched as given.
    pub async fn resolve_alias(&self, alias: &str) -> Option<String> {
        self.data.read().await.aliases.get(alias).cloned()
    }

    /// All aliases as `(alias, command)` pairs, ordered by alias.
    pub async fn aliases(&self) -> Vec<(String, String)> {
        self.data
            .read()
            .await
            .aliases
            .iter()
            .map(|(alias, command)| (alias.clone(), command.clone()))
            .collect()
    }

    /// Map `alias` to `command` and persist.
    ///
    /// Alias keys are stored lower-cased since the router lower-cases the
    /// command token before lookup. The command is stored verbatim and is
    /// not checked against registered commands. If the file cannot be
    /// written the alias is dropped again and the error returned.
    #[instrument(skip(self))]
    pub async fn add_alias(&self, command: &str, alias: &str) -> Result<(), StoreError> {
        let alias = alias.to_lowercase();
        let mut data = self.data.write().await;

        if data.aliases.contains_key(&alias) {
            return Err(StoreError::AliasExists(alias));
        }

        data.aliases.insert(alias.clone(), command.to_string());
        if let Err(e) = write_json_atomic(&self.path, &*data).await {
            data.aliases.remove(&alias);
            return Err(e);
        }
        debug!("Added alias {} -> {}", alias, command);
        Ok(())
    }

    /// Remove `alias` and persist. Returns the command it pointed to.
    ///
    /// A failed write restores the alias.
    #[instrument(skip(self))]
    pub async fn remove_alias(&self, alias: &str) -> Result<String, StoreError> {
        let alias = alias.to_lowercase();
        let mut data = self.data.write().await;

        let command = data
            .aliases
            .remove(&alias)
            .ok_or_else(|| StoreError::AliasNotFound(alias.clone()))?;

        if let Err(e) = write_json_atomic(&self.path, &*data).await {
            data.aliases.insert(alias, command);
            return Err(e);
        }
        debug!("Removed alias {} (was -> {})", alias, command);
        Ok(command)
    }

    pub async fn friends_count(&self) -> usize {
        self.data.read().await.friends_list.len()
    }

    pub async fn blacklist_count(&self) -> usize {
        self.data.read().await.blacklist.len()
    }
}

/// Pretty-print `value` as JSON and replace `path` with it.
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    // Write atomically using temp file + rename
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &bytes).await?;
    fs::rename(&temp_path, path).await?;

    debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}
