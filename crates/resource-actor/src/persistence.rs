//! # Persistence Collaborators
//!
//! The store actor keeps its working state in memory and hands the accumulated changes to a
//! [`Persistence`] backend when a commit is requested. A backend must apply one commit as a
//! single transaction: either every change lands or none does.
//!
//! Two backends are provided:
//!
//! - [`MemoryPersistence`] - an in-process table, used by default and in tests. It can be told
//!   to reject commits so storage failures can be exercised.
//! - [`JsonFilePersistence`] - a JSON array on disk, rewritten through a temporary file and an
//!   atomic rename.

use crate::entity::ResourceEntity;
use crate::error::PersistenceError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// One pending mutation recorded by the store between commits.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T: ResourceEntity> {
    /// Insert or overwrite the row for `entity.id()`.
    Upsert(T),
    /// Remove the row with this ID.
    Delete(T::Id),
}

/// Durable table of entity rows.
#[async_trait]
pub trait Persistence<T: ResourceEntity>: Send + Sync {
    /// Load every committed row. Called once when a store is opened.
    async fn load(&self) -> Result<Vec<T>, PersistenceError>;

    /// Apply `changes` in order as one transaction.
    async fn commit(&self, changes: &[Change<T>]) -> Result<(), PersistenceError>;
}

fn apply_changes<T: ResourceEntity>(rows: &mut BTreeMap<T::Id, T>, changes: &[Change<T>]) {
    for change in changes {
        match change {
            Change::Upsert(entity) => {
                rows.insert(entity.id(), entity.clone());
            }
            Change::Delete(id) => {
                rows.remove(id);
            }
        }
    }
}

// =============================================================================
// IN-MEMORY TABLE
// =============================================================================

/// In-process table. Commits succeed unless [`set_failing`](Self::set_failing) is on.
pub struct MemoryPersistence<T: ResourceEntity> {
    rows: Mutex<BTreeMap<T::Id, T>>,
    failing: AtomicBool,
    commits: AtomicUsize,
}

impl<T: ResourceEntity> Default for MemoryPersistence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceEntity> MemoryPersistence<T> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Seeds the table, as if the rows had been committed earlier.
    pub fn with_rows(rows: Vec<T>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().map(|row| (row.id(), row)).collect()),
            failing: AtomicBool::new(false),
            commits: AtomicUsize::new(0),
        }
    }

    /// When `true`, every commit is rejected and the table is left untouched.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the committed rows, ordered by ID.
    pub fn rows(&self) -> Vec<T> {
        let rows = self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rows.values().cloned().collect()
    }

    /// Number of commits that were applied.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: ResourceEntity> Persistence<T> for MemoryPersistence<T> {
    async fn load(&self) -> Result<Vec<T>, PersistenceError> {
        Ok(self.rows())
    }

    async fn commit(&self, changes: &[Change<T>]) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Rejected(
                "memory table is rejecting commits".to_string(),
            ));
        }
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| PersistenceError::Rejected("memory table lock poisoned".to_string()))?;
        apply_changes(&mut rows, changes);
        self.commits.fetch_add(1, Ordering::SeqCst);
        debug!(changes = changes.len(), rows = rows.len(), "Memory commit");
        Ok(())
    }
}

// =============================================================================
// JSON FILE TABLE
// =============================================================================

/// Table stored as a JSON array in a single file.
///
/// A commit reads the current file, applies the changes, writes the result to a sibling
/// `.tmp` file and renames it over the original. A crash mid-commit leaves the previous
/// version in place.
pub struct JsonFilePersistence<T> {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
    _rows: PhantomData<fn() -> T>,
}

impl<T> JsonFilePersistence<T>
where
    T: ResourceEntity + Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
            _rows: PhantomData,
        }
    }

    async fn read_rows(&self) -> Result<BTreeMap<T::Id, T>, PersistenceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let rows: Vec<T> = serde_json::from_slice(&bytes)?;
        Ok(rows.into_iter().map(|row| (row.id(), row)).collect())
    }
}

#[async_trait]
impl<T> Persistence<T> for JsonFilePersistence<T>
where
    T: ResourceEntity + Serialize + DeserializeOwned,
{
    async fn load(&self) -> Result<Vec<T>, PersistenceError> {
        let rows = self.read_rows().await?;
        info!(path = %self.path.display(), rows = rows.len(), "Loaded table");
        Ok(rows.into_values().collect())
    }

    async fn commit(&self, changes: &[Change<T>]) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_rows().await?;
        apply_changes(&mut rows, changes);

        let rows: Vec<&T> = rows.values().collect();
        let bytes = serde_json::to_vec_pretty(&rows)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), changes = changes.len(), rows = rows.len(), "File commit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u32,
        text: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("note error")]
    struct NoteError;

    impl ResourceEntity for Note {
        type Id = u32;
        type Create = String;
        type Error = NoteError;

        fn from_create_params(id: u32, text: String) -> Result<Self, Self::Error> {
            Ok(Self { id, text })
        }

        fn id(&self) -> u32 {
            self.id
        }
    }

    fn note(id: u32, text: &str) -> Note {
        Note {
            id,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_commit_applies_changes_in_order() {
        let table = MemoryPersistence::with_rows(vec![note(1, "a")]);
        table
            .commit(&[
                Change::Upsert(note(2, "b")),
                Change::Upsert(note(1, "a2")),
                Change::Delete(2),
            ])
            .await
            .unwrap();

        assert_eq!(table.rows(), vec![note(1, "a2")]);
        assert_eq!(table.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_rejecting_commit_leaves_rows() {
        let table = MemoryPersistence::with_rows(vec![note(1, "a")]);
        table.set_failing(true);

        let result = table.commit(&[Change::Delete(1)]).await;
        assert!(matches!(result, Err(PersistenceError::Rejected(_))));
        assert_eq!(table.rows(), vec![note(1, "a")]);
        assert_eq!(table.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_json_file_round_trips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let table = JsonFilePersistence::<Note>::new(&path);
        assert!(table.load().await.unwrap().is_empty());

        table
            .commit(&[Change::Upsert(note(1, "a")), Change::Upsert(note(3, "c"))])
            .await
            .unwrap();
        table.commit(&[Change::Delete(1)]).await.unwrap();

        let reopened = JsonFilePersistence::<Note>::new(&path);
        assert_eq!(reopened.load().await.unwrap(), vec![note(3, "c")]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_json_file_corrupt_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, b"not json").unwrap();

        let table = JsonFilePersistence::<Note>::new(&path);
        assert!(matches!(
            table.load().await,
            Err(PersistenceError::Serialization(_))
        ));
    }
}
