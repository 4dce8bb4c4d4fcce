//! File-backed storage
//!
//! Keeps every key in a single JSON object document. The file is re-read on
//! each access so several CLI invocations observe each other's writes.

use super::storage::{Storage, StorageResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/novelly/session.json`, or `./novelly_session.json`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|p| p.join("novelly").join("session.json"))
            .unwrap_or_else(|| PathBuf::from("./novelly_session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorageError;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));
        assert!(storage.get_item("jwtToken").unwrap().is_none());
        storage.remove_item("jwtToken").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_values_survive_new_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::new(&path);
        storage.set_item("jwtToken", "tok").unwrap();
        storage.set_item("bookmarks", "[3,4]").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("jwtToken").unwrap().as_deref(), Some("tok"));
        assert_eq!(reopened.get_item("bookmarks").unwrap().as_deref(), Some("[3,4]"));

        reopened.remove_item("jwtToken").unwrap();
        assert!(storage.get_item("jwtToken").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        let err = storage.get_item("jwtToken").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
