//! JSON file persistence for [`QuotaState`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::QuotaState;

/// Why a persisted record could not be used.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// No record has been written yet.
    #[error("no quota record at {0}")]
    Missing(PathBuf),

    /// The storage location could not be read or written.
    #[error("quota storage {action} failed for {path}: {err}")]
    Io {
        action: &'static str,
        path: PathBuf,
        err: io::Error,
    },

    /// The record exists but does not hold a valid [`QuotaState`].
    #[error("malformed quota record at {path}: {err}")]
    Malformed {
        path: PathBuf,
        err: serde_json::Error,
    },
}

/// Payload-free classification of a [`PersistError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistErrorKind {
    Missing,
    Io,
    Malformed,
}

impl PersistError {
    pub fn kind(&self) -> PersistErrorKind {
        match self {
            PersistError::Missing(_) => PersistErrorKind::Missing,
            PersistError::Io { .. } => PersistErrorKind::Io,
            PersistError::Malformed { .. } => PersistErrorKind::Malformed,
        }
    }

    fn io(action: &'static str, path: &Path, err: io::Error) -> Self {
        PersistError::Io {
            action,
            path: path.to_path_buf(),
            err,
        }
    }
}

type Result<T> = std::result::Result<T, PersistError>;

/// Reads and writes the quota record as a single JSON file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<QuotaState> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PersistError::Missing(self.path.clone()));
            }
            Err(e) => return Err(PersistError::io("read", &self.path, e)),
        };

        serde_json::from_slice(&raw).map_err(|err| PersistError::Malformed {
            path: self.path.clone(),
            err,
        })
    }

    /// Write the record through a sibling temporary file and rename it into
    /// place, so readers never see a partial record.
    pub fn save(&self, state: &QuotaState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistError::io("create_dir", parent, e))?;
        }

        let raw = serde_json::to_vec(state).map_err(|err| PersistError::Malformed {
            path: self.path.clone(),
            err,
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, raw).map_err(|e| PersistError::io("write", &tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistError::io("rename", &self.path, e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> QuotaState {
        QuotaState {
            last_reset_date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            request_count: 321,
            device_count: 4,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("quota.json"));

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("absent.json"));

        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), PersistErrorKind::Missing);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota.json");
        fs::write(&path, r#"{"last_reset_date":"not a date","request_count":1}"#).unwrap();

        let err = StateStore::new(&path).load().unwrap_err();
        assert_eq!(err.kind(), PersistErrorKind::Malformed);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota.json");
        fs::write(&path, r#"{"last_reset_date":"2024-01-01","request_count":1}"#).unwrap();

        let err = StateStore::new(&path).load().unwrap_err();
        assert_eq!(err.kind(), PersistErrorKind::Malformed);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested/deeper/quota.json"));

        store.save(&sample()).unwrap();
        assert!(store.path().exists());
        assert!(!dir.path().join("nested/deeper/quota.json.tmp").exists());
    }

    #[test]
    fn test_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the record should be makes both read and write fail
        let path = dir.path().join("quota.json");
        fs::create_dir(&path).unwrap();
        let store = StateStore::new(&path);

        assert_eq!(store.load().unwrap_err().kind(), PersistErrorKind::Io);
        assert_eq!(store.save(&sample()).unwrap_err().kind(), PersistErrorKind::Io);
    }
}
