//! Collection store over a string key-value backend.
//!
//! Three fixed keys hold the whole data set: user settings (single record),
//! video posts (list), social accounts (list). Every write serializes the
//! full collection back to its key; collection mutations run inside the
//! backend lock so concurrent upserts cannot lose each other's writes. Reads
//! are total: a missing or corrupt entry yields an empty collection, never
//! an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::constants::{SOCIAL_ACCOUNTS_KEY, USER_SETTINGS_KEY, VIDEO_POSTS_KEY};
use crate::models::{SocialMediaAccount, UserSettings, VideoPost};

/// Raw string mapping underneath the typed store.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    /// Replace the value under `key` atomically: the closure sees the current
    /// value and returns the new one (`None` removes the key), all under the
    /// backend's lock. Concurrent writers to the same key cannot interleave a
    /// stale read with their write.
    fn update(&self, key: &str, f: &mut dyn FnMut(Option<String>) -> Option<String>);
}

/// In-memory backend. The default, and what tests use.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    fn update(&self, key: &str, f: &mut dyn FnMut(Option<String>) -> Option<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match f(entries.get(key).cloned()) {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }
    }
}

/// File-backed backend: one JSON object file mapping keys to raw values.
///
/// The in-memory map is authoritative; the file is rewritten after every
/// mutation and write failures are only logged.
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::error!("Failed to create data dir {}: {}", parent.display(), e);
                }
            }
        }
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Corrupt data file {}, starting empty: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string(entries) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::error!("Failed to write {}: {}", self.path.display(), e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize data file: {}", e),
        }
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        self.persist(&entries);
    }

    fn update(&self, key: &str, f: &mut dyn FnMut(Option<String>) -> Option<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match f(entries.get(key).cloned()) {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }
        self.persist(&entries);
    }
}

/// Typed store over a [`StorageBackend`].
pub struct Store {
    backend: Arc<dyn StorageBackend>,
}

impl Store {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn on_disk(path: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(FileBackend::open(path.as_ref())))
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.backend.get(key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Corrupt entry under {:?}, treating as empty: {}", key, e);
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    /// Mutate the decoded collection inside the backend lock. Decode, mutate,
    /// and re-encode happen as one atomic step, so two concurrent upserts
    /// cannot overwrite each other from stale snapshots.
    fn update_list<T: Serialize + DeserializeOwned>(&self, key: &str, f: impl FnOnce(&mut Vec<T>)) {
        let mut f = Some(f);
        self.backend.update(key, &mut |current| {
            let mut items: Vec<T> = current
                .as_deref()
                .map(|raw| {
                    serde_json::from_str(raw).unwrap_or_else(|e| {
                        tracing::warn!("Corrupt entry under {:?}, treating as empty: {}", key, e);
                        Vec::new()
                    })
                })
                .unwrap_or_default();
            if let Some(f) = f.take() {
                f(&mut items);
            }
            match serde_json::to_string(&items) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    tracing::error!("Failed to serialize {:?}: {}", key, e);
                    current
                }
            }
        });
    }

    pub fn video_posts(&self) -> Vec<VideoPost> {
        self.read_list(VIDEO_POSTS_KEY)
    }

    pub fn video_post(&self, id: &str) -> Option<VideoPost> {
        self.video_posts().into_iter().find(|p| p.id == id)
    }

    /// Upsert by id: replace in place when the id exists, append otherwise.
    pub fn save_video_post(&self, post: &VideoPost) {
        self.update_list(VIDEO_POSTS_KEY, |posts: &mut Vec<VideoPost>| {
            match posts.iter_mut().find(|p| p.id == post.id) {
                Some(existing) => *existing = post.clone(),
                None => posts.push(post.clone()),
            }
        });
    }

    /// Remove by id. A no-op when the id is absent.
    pub fn delete_video_post(&self, id: &str) {
        self.update_list(VIDEO_POSTS_KEY, |posts: &mut Vec<VideoPost>| {
            posts.retain(|p| p.id != id)
        });
    }

    pub fn social_accounts(&self) -> Vec<SocialMediaAccount> {
        self.read_list(SOCIAL_ACCOUNTS_KEY)
    }

    pub fn social_account(&self, id: &str) -> Option<SocialMediaAccount> {
        self.social_accounts().into_iter().find(|a| a.id == id)
    }

    pub fn save_social_account(&self, account: &SocialMediaAccount) {
        self.update_list(SOCIAL_ACCOUNTS_KEY, |accounts: &mut Vec<SocialMediaAccount>| {
            match accounts.iter_mut().find(|a| a.id == account.id) {
                Some(existing) => *existing = account.clone(),
                None => accounts.push(account.clone()),
            }
        });
    }

    pub fn delete_social_account(&self, id: &str) {
        self.update_list(SOCIAL_ACCOUNTS_KEY, |accounts: &mut Vec<SocialMediaAccount>| {
            accounts.retain(|a| a.id != id)
        });
    }

    pub fn user_settings(&self) -> Option<UserSettings> {
        let raw = self.backend.get(USER_SETTINGS_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Corrupt user settings, treating as unset: {}", e);
                None
            }
        }
    }

    pub fn save_user_settings(&self, settings: &UserSettings) {
        match serde_json::to_string(settings) {
            Ok(raw) => self.backend.set(USER_SETTINGS_KEY, &raw),
            Err(e) => tracing::error!("Failed to serialize user settings: {}", e),
        }
    }
}
