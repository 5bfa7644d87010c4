//! Refresh credential persistence.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::warn;

use examdesk_core::error::ClientError;
use examdesk_core::traits::{CredentialStore, REFRESH_TOKEN_KEY};

/// Keeps the refresh credential in a small JSON object on disk,
/// `{"refreshToken": "..."}`. Other keys in the file are preserved.
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

    fn read_raw(&self) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    fn read_map(&self) -> Result<Map<String, Value>, ClientError> {
        match self.read_raw()? {
            Some(content) => {
                serde_json::from_str(&content).map_err(|e| storage_error(&self.path, e))
            }
            None => Ok(Map::new()),
        }
    }

    /// Like `read_map`, but a file that does not parse counts as empty.
    fn read_map_lenient(&self) -> Result<Map<String, Value>, ClientError> {
        match self.read_map() {
            Err(ClientError::Storage(reason)) if self.read_raw()?.is_some() => {
                warn!(path = %self.path.display(), %reason, "discarding unreadable credential file");
                Ok(Map::new())
            }
            other => other,
        }
    }

    /// Replace the file in one step. The temp file is 0600 before any
    /// content is written.
    fn write_map(&self, map: &Map<String, Value>) -> Result<(), ClientError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;

        let content =
            serde_json::to_string_pretty(map).map_err(|e| storage_error(&self.path, e))?;
        let mut file = NamedTempFile::new_in(dir).map_err(|e| storage_error(dir, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| storage_error(file.path(), e))?;
        }
        file.write_all(content.as_bytes())
            .map_err(|e| storage_error(file.path(), e))?;
        file.persist(&self.path)
            .map_err(|e| storage_error(&self.path, e))?;
        Ok(())
    }

    fn remove_file(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

fn storage_error(path: &Path, e: impl std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("{}: {e}", path.display()))
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        let map = self.read_map()?;
        Ok(map
            .get(REFRESH_TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    /// Overwrites a file that does not parse.
    fn save(&self, refresh_token: &str) -> Result<(), ClientError> {
        let mut map = self.read_map_lenient()?;
        map.insert(
            REFRESH_TOKEN_KEY.to_string(),
            Value::String(refresh_token.to_string()),
        );
        self.write_map(&map)
    }

    /// Removes a file that does not parse.
    fn clear(&self) -> Result<(), ClientError> {
        let mut map = self.read_map_lenient()?;
        if map.remove(REFRESH_TOKEN_KEY).is_none() && !map.is_empty() {
            return Ok(());
        }
        if map.is_empty() {
            self.remove_file()
        } else {
            self.write_map(&map)
        }
    }
}

/// In-process store, for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(refresh_token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(refresh_token.to_string())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // a poisoned slot still holds a plain string
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.lock().clone())
    }

    fn save(&self, refresh_token: &str) -> Result<(), ClientError> {
        *self.lock() = Some(refresh_token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("creds.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save("rt-1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("rt-1"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"refreshToken\""));

        store.save("rt-2").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("rt-2"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        store.save("rt-1").unwrap();
        store.clear().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains("refreshToken"));
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileCredentialStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }

    #[test]
    fn save_overwrites_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, r#"{"refreshTok"#).unwrap();

        let store = FileCredentialStore::new(&path);
        store.save("rt-1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("rt-1"));
    }

    #[test]
    fn clear_removes_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, r#"{"refreshTok"#).unwrap();

        FileCredentialStore::new(&path).clear().unwrap();
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("creds.json"));
        store.save("rt-1").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn memory_store() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("rt").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("rt"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
