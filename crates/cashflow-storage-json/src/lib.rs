//! cashflow-storage-json
//!
//! Filesystem-backed JSON persistence for projection snapshots.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use cashflow_domain::ProjectionSnapshot;
use thiserror::Error;

const SNAPSHOT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error in {path}: {message}")]
    Serde { path: PathBuf, message: String },

    #[error("Snapshot `{0}` not found")]
    NotFound(String),
}

/// Named snapshot persistence.
pub trait SnapshotStorage {
    fn save_snapshot(&self, name: &str, snapshot: &ProjectionSnapshot) -> Result<(), StorageError>;
    fn load_snapshot(&self, name: &str) -> Result<ProjectionSnapshot, StorageError>;
    fn list_snapshots(&self) -> Result<Vec<String>, StorageError>;
    fn delete_snapshot(&self, name: &str) -> Result<(), StorageError>;
}

/// Stores each snapshot as `<root>/<slug>.json`.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStorage {
    root: PathBuf,
}

impl JsonSnapshotStorage {
    pub fn new(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_name(name), SNAPSHOT_EXTENSION))
    }

    /// One summary row per stored snapshot, sorted by name.
    pub fn list_snapshot_metadata(&self) -> Result<Vec<SnapshotMetadata>, StorageError> {
        let mut rows = Vec::new();
        for slug in self.list_snapshots()? {
            let path = self.snapshot_path(&slug);
            let snapshot = load_snapshot_from_path(&path)?;
            rows.push(SnapshotMetadata {
                name: slug,
                path,
                initial_balance: snapshot.initial_balance,
                open_invoice_count: snapshot.open_invoice_count(),
                bill_count: snapshot.bills.len(),
                custom_flow_count: snapshot.custom_flows.len(),
            });
        }
        Ok(rows)
    }
}

impl SnapshotStorage for JsonSnapshotStorage {
    fn save_snapshot(&self, name: &str, snapshot: &ProjectionSnapshot) -> Result<(), StorageError> {
        save_snapshot_to_path(snapshot, &self.snapshot_path(name))
    }

    fn load_snapshot(&self, name: &str) -> Result<ProjectionSnapshot, StorageError> {
        let path = self.snapshot_path(name);
        if !path.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        load_snapshot_from_path(&path)
    }

    fn list_snapshots(&self) -> Result<Vec<String>, StorageError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_snapshot(&self, name: &str) -> Result<(), StorageError> {
        let path = self.snapshot_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub name: String,
    pub path: PathBuf,
    pub initial_balance: f64,
    pub open_invoice_count: usize,
    pub bill_count: usize,
    pub custom_flow_count: usize,
}

/// Writes a snapshot to an arbitrary path through a temp file.
pub fn save_snapshot_to_path(
    snapshot: &ProjectionSnapshot,
    path: &Path,
) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot).map_err(|err| StorageError::Serde {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a snapshot from the provided filesystem path.
pub fn load_snapshot_from_path(path: &Path) -> Result<ProjectionSnapshot, StorageError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| StorageError::Serde {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "snapshot".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_are_filesystem_safe() {
        assert_eq!(canonical_name("Q3 Forecast"), "q3_forecast");
        assert_eq!(canonical_name("march-2024"), "march-2024");
        assert_eq!(canonical_name("  ../  "), "snapshot");
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let path = Path::new("/data/book.json");
        assert_eq!(tmp_path(path), PathBuf::from("/data/book.json.tmp"));
    }
}
