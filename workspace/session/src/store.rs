//! The durable record of "the household the user has explicitly chosen to
//! act in".
//!
//! There is deliberately no expiry here: household selection is a user
//! decision, not a cache line. The record stands until an explicit user
//! action replaces it, the server confirms the same id with drifted
//! name/role, or the household ceases to exist.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use model::household::SelectionRecord;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Key for the selection record in the local key/value store.
pub const SELECTION_KEY: &str = "householdSelection";
/// Key for the cached user profile.
pub const PROFILE_KEY: &str = "profileCache";

/// The platform-local key/value store behind the selection record.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn persist(&self) -> io::Result<()>;
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .map(|guard| guard.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut guard) = self.data.lock() {
            guard.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut guard) = self.data.lock() {
            guard.remove(key);
        }
    }

    fn persist(&self) -> io::Result<()> {
        Ok(())
    }
}

/// JSON-file backend so selection survives process restarts.
pub struct FileStore {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn load(path: impl AsRef<Path>) -> io::Result<Arc<Self>> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(%err, path = %path.display(), "local state file unreadable, starting fresh");
                HashMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err),
        };
        Ok(Arc::new(Self {
            path,
            data: Mutex::new(data),
        }))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .map(|guard| guard.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut guard) = self.data.lock() {
            guard.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut guard) = self.data.lock() {
            guard.remove(key);
        }
    }

    fn persist(&self) -> io::Result<()> {
        let guard = self
            .data
            .lock()
            .map_err(|_| io::Error::other("state lock poisoned"))?;
        let raw = serde_json::to_string_pretty(&*guard)
            .map_err(|err| io::Error::other(err.to_string()))?;
        // Write-then-rename so a crash never leaves a torn state file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)
    }
}

/// Single-writer store of the active household selection.
///
/// Writers are the explicit "switch household" action and the resolver's
/// one-time first-run fallback; every other component only reads.
/// `get` never blocks and never touches the network; `set` is atomic from
/// the caller's perspective and notifies same-process observers
/// synchronously through the watch channel.
pub struct HouseholdStore {
    backend: Arc<dyn KeyValueStore>,
    current: watch::Sender<Option<SelectionRecord>>,
}

impl HouseholdStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let initial = backend.get(SELECTION_KEY).and_then(|raw| {
            serde_json::from_str::<SelectionRecord>(&raw)
                .map_err(|err| {
                    warn!(%err, "stored household selection unreadable, ignoring");
                })
                .ok()
        });
        if let Some(record) = &initial {
            debug!(id = %record.id, "loaded household selection");
        }
        let (current, _) = watch::channel(initial);
        Self { backend, current }
    }

    pub fn get(&self) -> Option<SelectionRecord> {
        self.current.borrow().clone()
    }

    pub fn current_id(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|r| r.id.clone())
    }

    /// Observers see every change, including the initial value.
    pub fn subscribe(&self) -> watch::Receiver<Option<SelectionRecord>> {
        self.current.subscribe()
    }

    pub fn set(&self, record: SelectionRecord) {
        info!(id = %record.id, name = %record.name, "household selection set");
        self.current.send_replace(Some(record.clone()));
        match serde_json::to_string(&record) {
            Ok(raw) => {
                self.backend.set(SELECTION_KEY, &raw);
                if let Err(err) = self.backend.persist() {
                    // Degrades gracefully to refetch-from-server next run.
                    warn!(%err, "failed to persist household selection");
                }
            }
            Err(err) => warn!(%err, "failed to serialize household selection"),
        }
    }

    pub fn clear(&self) {
        info!("household selection cleared");
        self.current.send_replace(None);
        self.backend.remove(SELECTION_KEY);
        if let Err(err) = self.backend.persist() {
            warn!(%err, "failed to persist cleared household selection");
        }
    }
}
