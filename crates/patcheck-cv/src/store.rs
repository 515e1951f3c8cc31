//! Process-wide pattern catalog with whole-catalog replacement

use patcheck_core::PatternCatalog;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Shared, read-mostly pattern catalog.
///
/// Readers take an `Arc` snapshot and match against it without holding the
/// lock. A reload swaps in a complete new catalog; a snapshot taken before
/// the swap keeps seeing the old one.
#[derive(Debug, Default)]
pub struct PatternStore {
    current: RwLock<Arc<PatternCatalog>>,
}

impl PatternStore {
    pub fn new(catalog: PatternCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Consistent view of the catalog for one call
    pub fn snapshot(&self) -> Arc<PatternCatalog> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the whole catalog, returning the previous one
    pub fn replace(&self, catalog: PatternCatalog) -> Arc<PatternCatalog> {
        let next = Arc::new(catalog);
        debug!("Replacing pattern catalog ({} librar(ies))", next.len());

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
