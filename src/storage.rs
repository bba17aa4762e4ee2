// Small on-disk persistence helpers shared by the config and session files.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to the persisted session layout require incrementing
// SESSION_FILE_VERSION so older files are discarded instead of misread.
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const SESSION_FILE_VERSION: u32 = 1;

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive advisory lock next to `file_path`.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads and parses a JSON file under its lock. `Ok(None)` if it does not exist.
    pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::with_lock(path, || {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let value = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse '{}'", path.display()))?;
            Ok(Some(value))
        })
    }

    pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        Self::with_lock(path, || {
            let json = serde_json::to_string_pretty(value)?;
            Self::atomic_write(path, json)?;
            Ok(())
        })
    }

    pub fn remove(path: &Path) -> Result<()> {
        Self::with_lock(path, || {
            if path.exists() {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to remove '{}'", path.display()))?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn temp_file(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eventdesk_storage_{}_{}", tag, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("sample.json")
    }

    #[test]
    fn test_lock_path_appends_extension() {
        assert_eq!(
            LocalStorage::get_lock_path(Path::new("/tmp/session.json")),
            PathBuf::from("/tmp/session.json.lock")
        );
        assert_eq!(
            LocalStorage::get_lock_path(Path::new("/tmp/session")),
            PathBuf::from("/tmp/session.lock")
        );
    }

    #[test]
    fn test_json_write_then_read() {
        let path = temp_file("rw");
        assert!(LocalStorage::read_json::<Sample>(&path).unwrap().is_none());

        let sample = Sample {
            name: "probe".to_string(),
            count: 3,
        };
        LocalStorage::write_json(&path, &sample).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(LocalStorage::read_json::<Sample>(&path).unwrap(), Some(sample));

        LocalStorage::remove(&path).unwrap();
        assert!(!path.exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_read_reports_corrupt_file() {
        let path = temp_file("corrupt");
        fs::write(&path, "{ not json").unwrap();
        let err = LocalStorage::read_json::<Sample>(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
