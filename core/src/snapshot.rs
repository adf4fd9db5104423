use crate::index::InvertedIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// A swappable handle to the current index of one corpus.
///
/// Readers take an `Arc` snapshot and query it without holding any lock; a
/// rebuild installs a complete new index in one step, so a reader sees either
/// the old index or the new one, never a mix.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Arc<InvertedIndex>>,
}

impl SharedIndex {
    pub fn new(index: InvertedIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn snapshot(&self) -> Arc<InvertedIndex> {
        self.current.read().clone()
    }

    /// Install `index` and return the one it replaced.
    pub fn replace(&self, index: InvertedIndex) -> Arc<InvertedIndex> {
        let next = Arc::new(index);
        std::mem::replace(&mut *self.current.write(), next)
    }
}

impl From<InvertedIndex> for SharedIndex {
    fn from(index: InvertedIndex) -> Self {
        Self::new(index)
    }
}
