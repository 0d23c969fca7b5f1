//! Last-write-wins holder for the stage payloads.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use super::payload::{ClassificationResult, ExtractionResult, VectorizationResult};

/// Identifies the run a write belongs to. Tokens are handed out by
/// [`ResultStore::invalidate`] and only the most recent one may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunToken(u64);

/// The three payloads, copied out of the store in one read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResults {
    pub classification: Option<ClassificationResult>,
    pub vectorization: Option<VectorizationResult>,
    pub extraction: Option<ExtractionResult>,
}

#[derive(Default)]
struct StoreState {
    generation: u64,
    results: StoredResults,
}

/// Shared payload store.
///
/// Clearing and bumping the generation happen under one write lock, so a
/// writer holding an older token either lands before the clear (and is wiped
/// by it) or is rejected.
#[derive(Clone, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<StoreState>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Result store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Result store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Clears every payload and returns the token for the next run.
    /// Any token issued earlier stops being current.
    pub fn invalidate(&self) -> RunToken {
        let mut state = self.write();
        state.generation += 1;
        state.results = StoredResults::default();
        RunToken(state.generation)
    }

    /// The token writes must currently carry.
    pub fn current_token(&self) -> RunToken {
        RunToken(self.read().generation)
    }

    pub fn is_current(&self, token: RunToken) -> bool {
        self.read().generation == token.0
    }

    /// Applies `update` if `token` is current. Returns whether it was applied.
    fn publish_with(&self, token: RunToken, update: impl FnOnce(&mut StoredResults)) -> bool {
        let mut state = self.write();
        if state.generation != token.0 {
            return false;
        }
        update(&mut state.results);
        true
    }

    pub fn publish_classification(&self, token: RunToken, value: ClassificationResult) -> bool {
        self.publish_with(token, |r| r.classification = Some(value))
    }

    pub fn publish_vectorization(&self, token: RunToken, value: VectorizationResult) -> bool {
        self.publish_with(token, |r| r.vectorization = Some(value))
    }

    pub fn publish_extraction(&self, token: RunToken, value: ExtractionResult) -> bool {
        self.publish_with(token, |r| r.extraction = Some(value))
    }

    pub fn classification(&self) -> Option<ClassificationResult> {
        self.read().results.classification.clone()
    }

    pub fn vectorization(&self) -> Option<VectorizationResult> {
        self.read().results.vectorization.clone()
    }

    pub fn extraction(&self) -> Option<ExtractionResult> {
        self.read().results.extraction.clone()
    }

    pub fn has_extraction(&self) -> bool {
        self.read().results.extraction.is_some()
    }

    pub fn results(&self) -> StoredResults {
        self.read().results.clone()
    }
}
