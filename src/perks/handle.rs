//! Shared, swappable reference to the live catalog

use crate::perks::catalog::PerkCatalog;
use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable handle to the current catalog
///
/// Readers take an `Arc` snapshot and keep using it even if a reload
/// publishes a new catalog meanwhile. The lock only guards the pointer swap.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<PerkCatalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: PerkCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Snapshot of the catalog as of now
    pub fn current(&self) -> Arc<PerkCatalog> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the catalog for all future readers
    pub fn publish(&self, catalog: PerkCatalog) -> Arc<PerkCatalog> {
        let next = Arc::new(catalog);
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
        tracing::info!("Published perk catalog with {} nodes", next.len());
        next
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new(PerkCatalog::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::School;

    #[test]
    fn test_snapshot_survives_publish() {
        let handle = CatalogHandle::default();
        let before = handle.current();

        let (catalog, _) = PerkCatalog::load_documents([(
            School::Earth,
            r#"{"perks": [{"id": "stone_skin_1", "perk": "PASSIVE_STONE_SKIN", "tier": 1, "pointCost": 1, "category": "PASSIVE", "amount": 1, "time": 20}]}"#,
        )]);
        handle.publish(catalog);

        assert!(before.is_empty());
        assert_eq!(handle.current().len(), 1);
        assert_eq!(handle.clone().current().max_points(School::Earth), 1);
    }
}
