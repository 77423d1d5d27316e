use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::fs;

/// The persisted schema: the buffer text and the one-time welcome flag.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersistedState {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub welcomed: bool,
}

/// Durable storage for the notepad. One JSON file, last-write-wins.
///
/// Storage failures are never fatal: every error is logged and swallowed,
/// and the in-memory state stays authoritative for the session.
pub struct Store {
    path: Option<PathBuf>,
    state: PersistedState,
    restored: bool,
    dirty: bool,
    last_change: Option<Instant>,
    debounce: Duration,
}

impl Store {
    /// Open the store and read any previously saved state. Never fails;
    /// an unusable backend degrades to a memory-only session.
    pub async fn load(debounce: Duration) -> Self {
        let path = Self::state_path();
        let mut state = PersistedState::default();
        let mut restored = false;

        if let Some(ref path) = path {
            match fs::read_to_string(path).await {
                Ok(raw) => match serde_json::from_str::<PersistedState>(&raw) {
                    Ok(parsed) => {
                        log::info!("Restored notes from: {}", path.display());
                        state = parsed;
                        restored = true;
                    }
                    Err(e) => {
                        log::error!("Failed to parse saved notes: {}", e);
                        // Keep the broken file around rather than clobbering it.
                        let backup = path.with_extension("bak");
                        match fs::copy(path, &backup).await {
                            Ok(_) => log::info!("Backed up broken notes to: {}", backup.display()),
                            Err(e) => log::warn!("Failed to back up broken notes: {}", e),
                        }
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::info!("No saved notes yet, starting empty");
                }
                Err(e) => {
                    log::warn!("Failed to read saved notes: {}", e);
                }
            }
        } else {
            log::warn!("No data directory available; notes will not persist");
        }

        Self {
            path,
            state,
            restored,
            dirty: false,
            last_change: None,
            debounce,
        }
    }

    /// The saved buffer text, if a previous session left one behind.
    pub fn saved_content(&self) -> Option<&str> {
        if self.restored && !self.state.content.is_empty() {
            Some(&self.state.content)
        } else {
            None
        }
    }

    pub fn has_seen_welcome(&self) -> bool {
        self.state.welcomed
    }

    pub fn mark_welcome_seen(&mut self) {
        self.state.welcomed = true;
        self.touch();
    }

    /// Record the latest buffer text. Cheap; the actual write happens on
    /// the next due flush.
    pub fn record_change(&mut self, text: String) {
        self.state.content = text;
        self.touch();
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.last_change = Some(Instant::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether enough keystroke quiet has passed to write the dirty state.
    pub fn flush_due(&self) -> bool {
        match (self.dirty, self.last_change) {
            (true, Some(at)) => at.elapsed() >= self.debounce,
            _ => false,
        }
    }

    /// Write the state out if dirty. Failures are swallowed; the store
    /// stays dirty and retries after the next debounce window.
    pub async fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        let Some(ref path) = self.path else {
            // Nowhere to write; drop the dirty flag so we stop retrying.
            self.dirty = false;
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                log::warn!("Could not create data directory: {}", e);
                self.last_change = Some(Instant::now());
                return;
            }
        }

        let json = match serde_json::to_string_pretty(&self.state) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize notes: {}", e);
                self.last_change = Some(Instant::now());
                return;
            }
        };

        match fs::write(path, json).await {
            Ok(_) => {
                log::debug!("Autosaved {} chars", self.state.content.chars().count());
                self.dirty = false;
            }
            Err(e) => {
                log::warn!("Autosave failed: {}", e);
                self.last_change = Some(Instant::now());
            }
        }
    }

    /// Flush regardless of the debounce window. Used on quit.
    pub async fn flush_now(&mut self) {
        self.flush().await;
    }

    /// A store with no backing file, for exercising app logic in tests.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self {
            path: None,
            state: PersistedState::default(),
            restored: false,
            dirty: false,
            last_change: None,
            debounce: Duration::ZERO,
        }
    }

    /// An in-memory store that behaves as if `content` had been restored
    /// from a previous session.
    #[cfg(test)]
    pub(crate) fn in_memory_restored(content: &str) -> Self {
        let mut store = Self::in_memory();
        store.state.content = content.to_string();
        store.restored = true;
        store
    }

    fn state_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("KITTYNOTES_DATA_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("KITTYNOTES_DATA_DIR") {
            return Some(PathBuf::from(dir).join("notes.json"));
        }

        ProjectDirs::from("com", "kittynotes", "kittynotes")
            .map(|dirs| dirs.data_dir().join("notes.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn store_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn set_data_dir(path: &std::path::Path) -> (Option<String>, Option<String>) {
        let previous_dir = std::env::var("KITTYNOTES_DATA_DIR").ok();
        let previous_path = std::env::var("KITTYNOTES_DATA_PATH").ok();
        std::env::set_var("KITTYNOTES_DATA_DIR", path);
        std::env::remove_var("KITTYNOTES_DATA_PATH");
        (previous_dir, previous_path)
    }

    fn restore_data_env(previous: (Option<String>, Option<String>)) {
        match previous.0 {
            Some(value) => std::env::set_var("KITTYNOTES_DATA_DIR", value),
            None => std::env::remove_var("KITTYNOTES_DATA_DIR"),
        }
        match previous.1 {
            Some(value) => std::env::set_var("KITTYNOTES_DATA_PATH", value),
            None => std::env::remove_var("KITTYNOTES_DATA_PATH"),
        }
    }

    #[tokio::test]
    async fn test_round_trip_across_restart() {
        let _guard = store_test_lock().lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let previous = set_data_dir(temp_dir.path());

        let mut store = Store::load(Duration::ZERO).await;
        assert!(store.saved_content().is_none());

        store.record_change("nine lives\nand counting".to_string());
        store.flush_now().await;
        assert!(!store.is_dirty());

        // Simulated restart: a fresh store instance over the same backend.
        let reopened = Store::load(Duration::ZERO).await;
        assert_eq!(
            reopened.saved_content(),
            Some("nine lives\nand counting")
        );

        restore_data_env(previous);
    }

    #[tokio::test]
    async fn test_welcome_flag_round_trip() {
        let _guard = store_test_lock().lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let previous = set_data_dir(temp_dir.path());

        let mut store = Store::load(Duration::ZERO).await;
        assert!(!store.has_seen_welcome());
        store.mark_welcome_seen();
        store.flush_now().await;

        let reopened = Store::load(Duration::ZERO).await;
        assert!(reopened.has_seen_welcome());
        assert!(reopened.saved_content().is_none());

        restore_data_env(previous);
    }

    #[tokio::test]
    async fn test_debounce_gates_flush() {
        let _guard = store_test_lock().lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let previous = set_data_dir(temp_dir.path());

        let mut store = Store::load(Duration::from_secs(3600)).await;
        store.record_change("draft".to_string());
        assert!(store.is_dirty());
        assert!(!store.flush_due());

        // flush_now ignores the debounce window.
        store.flush_now().await;
        assert!(!store.is_dirty());

        restore_data_env(previous);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_backed_up_and_ignored() {
        let _guard = store_test_lock().lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let previous = set_data_dir(temp_dir.path());

        let path = temp_dir.path().join("notes.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = Store::load(Duration::ZERO).await;
        assert!(store.saved_content().is_none());
        assert!(!store.has_seen_welcome());
        assert!(path.with_extension("bak").exists());

        restore_data_env(previous);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let _guard = store_test_lock().lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let previous = set_data_dir(temp_dir.path());

        let mut store = Store::load(Duration::ZERO).await;
        store.record_change("first".to_string());
        store.flush_now().await;
        store.record_change("second".to_string());
        store.flush_now().await;

        let reopened = Store::load(Duration::ZERO).await;
        assert_eq!(reopened.saved_content(), Some("second"));

        restore_data_env(previous);
    }

    #[tokio::test]
    async fn test_empty_saved_content_is_absent() {
        let _guard = store_test_lock().lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let previous = set_data_dir(temp_dir.path());

        let mut store = Store::load(Duration::ZERO).await;
        store.record_change(String::new());
        store.flush_now().await;

        let reopened = Store::load(Duration::ZERO).await;
        assert!(reopened.saved_content().is_none());

        restore_data_env(previous);
    }
}
