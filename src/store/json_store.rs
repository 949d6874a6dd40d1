use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::store::KeyValueStore;

const STORE_FILE: &str = "store.json";

/// Key-value store kept as one JSON object on disk. Every mutation
/// rewrites the whole file through a temp file and a rename, so a crash
/// leaves either the old or the new document.
pub struct JsonFileStore {
    base_dir: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store in the platform data directory.
    pub fn open_default() -> io::Result<Self> {
        Self::with_base_dir(default_data_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let entries = read_entries(&base_dir.join(STORE_FILE));
        Ok(Self { base_dir, entries })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(STORE_FILE)
    }

    fn tmp_path(&self) -> PathBuf {
        self.file_path().with_extension("json.tmp")
    }

    fn commit(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        let path = self.file_path();
        let tmp_path = self.tmp_path();

        let json = serde_json::to_string_pretty(entries)?;
        let staged = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })();
        if let Err(e) = staged {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &path)
    }

    /// Apply `change` to a copy of the entries and keep it only once it is
    /// on disk.
    fn update(&mut self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> io::Result<()> {
        let mut next = self.entries.clone();
        change(&mut next);
        self.commit(&next)?;
        self.entries = next;
        Ok(())
    }

    /// Remove a temp file left behind by an interrupted write. Returns true
    /// if one was found.
    pub fn recover_interrupted_write(&self) -> bool {
        let tmp = self.tmp_path();
        if tmp.exists() {
            let _ = fs::remove_file(&tmp);
            tracing::warn!(path = %tmp.display(), "removed leftover temp file from an interrupted write");
            true
        } else {
            false
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timesquiz")
}

/// Missing or unreadable files read as an empty store.
fn read_entries(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        return BTreeMap::new();
    }
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring corrupt store file: {e}");
            BTreeMap::new()
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), "cannot read store file: {e}");
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn set_many(&mut self, batch: &[(String, String)]) -> io::Result<()> {
        self.update(|entries| {
            for (key, value) in batch {
                entries.insert(key.clone(), value.clone());
            }
        })
    }

    fn remove_many(&mut self, keys: &[&str]) -> io::Result<()> {
        self.update(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonFileStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_values_survive_reopen() {
        let (dir, mut store) = make_test_store();
        store.set("quiz_user_name", "Grace").unwrap();
        store.set("quiz_scores_easy", "[]").unwrap();

        let reopened = JsonFileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get("quiz_user_name").as_deref(), Some("Grace"));
        assert_eq!(reopened.get("quiz_scores_easy").as_deref(), Some("[]"));
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STORE_FILE), "{not json").unwrap();
        let store = JsonFileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.get("quiz_user_name").is_none());
    }

    #[test]
    fn test_failed_commit_keeps_previous_state() {
        let (dir, mut store) = make_test_store();
        store.set("a", "1").unwrap();

        // A directory where the temp file should go makes staging fail.
        fs::create_dir(store.tmp_path()).unwrap();
        let result = store.set_many(&[
            ("a".to_string(), "2".to_string()),
            ("b".to_string(), "3".to_string()),
        ]);
        assert!(result.is_err());
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert!(store.get("b").is_none());

        let reopened = JsonFileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_no_temp_file_left_after_write() {
        let (_dir, mut store) = make_test_store();
        store.set("k", "v").unwrap();
        assert!(!store.tmp_path().exists());
        assert!(store.file_path().exists());
    }

    #[test]
    fn test_recover_interrupted_write() {
        let (_dir, store) = make_test_store();
        assert!(!store.recover_interrupted_write());
        fs::write(store.tmp_path(), "{}").unwrap();
        assert!(store.recover_interrupted_write());
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_remove_many() {
        let (_dir, mut store) = make_test_store();
        store.set("x", "1").unwrap();
        store.set("y", "2").unwrap();
        store.remove_many(&["x", "y"]).unwrap();
        assert!(store.get("x").is_none());
        assert!(store.get("y").is_none());
    }
}
