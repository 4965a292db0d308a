//! Crash-safe collection files.
//!
//! A collection is one JSON document on disk. Writers serialize the whole
//! collection into a temp file in the same directory and rename it over the
//! old one, so readers see either the previous or the next version.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PersistenceError, Result};

/// Replaces the file at `path` with the JSON encoding of `value`.
pub fn replace_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    let dir = path.parent().unwrap_or(Path::new("."));

    let write_err = |source: std::io::Error| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(&data).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Loads the JSON document at `path`, or `None` if it was never written.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::ReadError {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(serde_json::from_slice(&data)?))
}

/// Loads a list-shaped collection, treating a missing file as empty.
pub fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    Ok(load_json(path)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_replace_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("admins.json");

        replace_json(&path, &vec![1, 2, 3]).unwrap();
        let loaded: Vec<i32> = load_list(&path).unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);

        replace_json(&path, &vec![4]).unwrap();
        let loaded: Vec<i32> = load_list(&path).unwrap();
        assert_eq!(loaded, vec![4]);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let loaded: Option<serde_json::Value> = load_json(&path).unwrap();
        assert!(loaded.is_none());
        let list: Vec<i32> = load_list(&path).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{not json").unwrap();

        let result: Result<Option<Vec<i32>>> = load_json(&path);
        assert!(matches!(result, Err(PersistenceError::SerializeError(_))));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.json");

        replace_json(&path, &true).unwrap();
        replace_json(&path, &false).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
