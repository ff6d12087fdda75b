//! Shared catalog handle
//!
//! Readers take an `Arc<Catalog>` snapshot and keep using it for the whole request;
//! a rebuild swaps the pointer without touching snapshots already handed out.

use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::types::Catalog;

#[derive(Debug, Clone, Default)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Current catalog snapshot
    pub fn current(&self) -> Arc<Catalog> {
        // Only a pointer is ever written under the lock, so a poisoned guard is still valid.
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new catalog, returning the previous snapshot
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
