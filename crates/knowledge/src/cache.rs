//! Process-wide cache of built document indexes.
//!
//! Keyed by content hash, so re-uploading identical bytes reuses the index
//! and concurrent requests for the same document build it exactly once.
//! Entries live for the life of the process.

use crate::index::DocumentIndex;
use crate::types::DocumentId;
use finqa_core::{AppError, AppResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<DocumentIndex>>>;

/// Single-flight index cache.
#[derive(Debug, Default)]
pub struct IndexCache {
    slots: Mutex<HashMap<DocumentId, Slot>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached index for `id`, running `build` if there is none.
    ///
    /// Concurrent callers for the same id wait on one build. A failed build
    /// leaves the slot empty so the next caller retries.
    pub async fn get_or_build<F, Fut>(&self, id: &DocumentId, build: F) -> AppResult<Arc<DocumentIndex>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<DocumentIndex>>,
    {
        let slot = self.slot(id)?;

        if let Some(index) = slot.get() {
            tracing::debug!(document = %id.short(), "Index cache hit");
            return Ok(Arc::clone(index));
        }

        let index = slot
            .get_or_try_init(|| async {
                tracing::info!(document = %id.short(), "Building document index");
                build().await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(index))
    }

    /// Whether a built index exists for `id`.
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.get(id).is_some_and(|slot| slot.initialized()))
            .unwrap_or(false)
    }

    /// Number of built indexes.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.values().filter(|slot| slot.initialized()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: &DocumentId) -> AppResult<Slot> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AppError::Knowledge("Index cache lock poisoned".to_string()))?;
        Ok(Arc::clone(
            slots
                .entry(id.clone())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        ))
    }
}
