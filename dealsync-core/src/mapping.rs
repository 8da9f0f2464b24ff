//! Local-deal ↔ remote-deal mapping store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.dealsync/
//!   mappings.json   ({ "mappings": [ { deal_id, remote_deal_id, created_at } ] })
//! ```
//!
//! Writes use the atomic `.tmp` sibling + rename pattern. A missing file is an
//! empty store; an unreadable or malformed file is an error, never "not found".

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::MappingError;
use crate::types::{DealId, Mapping, RemoteDealId};

/// Persisted 1:1 association between local and remote deal ids.
///
/// `lookup` distinguishes "not found" (`Ok(None)`) from failure (`Err`).
/// `create` refuses a second mapping for the same local deal id.
pub trait MappingStore {
    fn lookup(&self, deal_id: &DealId) -> Result<Option<Mapping>, MappingError>;

    fn create(
        &mut self,
        deal_id: &DealId,
        remote_deal_id: &RemoteDealId,
    ) -> Result<Mapping, MappingError>;
}

impl<T: MappingStore + ?Sized> MappingStore for &mut T {
    fn lookup(&self, deal_id: &DealId) -> Result<Option<Mapping>, MappingError> {
        (**self).lookup(deal_id)
    }

    fn create(
        &mut self,
        deal_id: &DealId,
        remote_deal_id: &RemoteDealId,
    ) -> Result<Mapping, MappingError> {
        (**self).create(deal_id, remote_deal_id)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MappingFile {
    #[serde(default)]
    mappings: Vec<Mapping>,
}

/// `<home>/.dealsync/mappings.json`. Pure, no I/O.
pub fn store_path_at(home: &Path) -> PathBuf {
    home.join(".dealsync").join("mappings.json")
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// JSON-file mapping store.
#[derive(Debug, Clone)]
pub struct FileMappingStore {
    path: PathBuf,
}

impl FileMappingStore {
    /// Store rooted at an explicit home directory; used by tests with `TempDir`.
    pub fn at(home: &Path) -> Self {
        Self {
            path: store_path_at(home),
        }
    }

    /// Store under `dirs::home_dir()`.
    pub fn open() -> Result<Self, MappingError> {
        let home = dirs::home_dir().ok_or(MappingError::HomeNotFound)?;
        Ok(Self::at(&home))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All mappings, ordered by creation time.
    pub fn list(&self) -> Result<Vec<Mapping>, MappingError> {
        let mut mappings = self.load()?.mappings;
        mappings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(mappings)
    }

    fn load(&self) -> Result<MappingFile, MappingError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(MappingFile::default());
            }
            Err(e) => return Err(io_err(&self.path, e)),
        };
        serde_json::from_str(&contents).map_err(|source| MappingError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, file: &MappingFile) -> Result<(), MappingError> {
        let Some(dir) = self.path.parent() else {
            return Err(io_err(
                &self.path,
                std::io::Error::other("invalid mapping store path"),
            ));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        set_file_permissions(&tmp)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        Ok(())
    }
}

impl MappingStore for FileMappingStore {
    fn lookup(&self, deal_id: &DealId) -> Result<Option<Mapping>, MappingError> {
        Ok(self
            .load()?
            .mappings
            .into_iter()
            .find(|m| &m.deal_id == deal_id))
    }

    fn create(
        &mut self,
        deal_id: &DealId,
        remote_deal_id: &RemoteDealId,
    ) -> Result<Mapping, MappingError> {
        let mut file = self.load()?;
        if let Some(existing) = file.mappings.iter().find(|m| &m.deal_id == deal_id) {
            return Err(MappingError::Duplicate {
                deal_id: deal_id.clone(),
                remote_deal_id: existing.remote_deal_id.clone(),
            });
        }
        let mapping = Mapping {
            deal_id: deal_id.clone(),
            remote_deal_id: remote_deal_id.clone(),
            created_at: Utc::now(),
        };
        file.mappings.push(mapping.clone());
        self.save(&file)?;
        Ok(mapping)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-process mapping store with the same contract as [`FileMappingStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryMappingStore {
    mappings: Vec<Mapping>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }
}

impl MappingStore for MemoryMappingStore {
    fn lookup(&self, deal_id: &DealId) -> Result<Option<Mapping>, MappingError> {
        Ok(self.mappings.iter().find(|m| &m.deal_id == deal_id).cloned())
    }

    fn create(
        &mut self,
        deal_id: &DealId,
        remote_deal_id: &RemoteDealId,
    ) -> Result<Mapping, MappingError> {
        if let Some(existing) = self.lookup(deal_id)? {
            return Err(MappingError::Duplicate {
                deal_id: deal_id.clone(),
                remote_deal_id: existing.remote_deal_id,
            });
        }
        let mapping = Mapping {
            deal_id: deal_id.clone(),
            remote_deal_id: remote_deal_id.clone(),
            created_at: Utc::now(),
        };
        self.mappings.push(mapping.clone());
        Ok(mapping)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MappingError {
    MappingError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), MappingError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), MappingError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
