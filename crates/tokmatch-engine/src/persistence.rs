//! Durable storage for open orders.
//!
//! After every mutation the owning actor writes the asset's full set of
//! open orders through a [`SnapshotStore`]. On restart a book is rebuilt
//! purely from each order's `(price, sequence)`, so the store may return
//! orders in any iteration order.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokmatch_types::{AssetId, Order, Result};

/// Persists and reloads the open orders of one asset.
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored open-order set for `asset_id`.
    ///
    /// # Errors
    /// Returns `PersistenceFailed` when the write does not complete.
    fn save(&self, asset_id: &AssetId, orders: &[Order]) -> Result<()>;

    /// Load the stored open-order set for `asset_id`. An asset never seen
    /// before yields an empty set.
    ///
    /// # Errors
    /// Returns `PersistenceFailed` when the read does not complete.
    fn load(&self, asset_id: &AssetId) -> Result<Vec<Order>>;

    /// Every asset with a stored snapshot, so a restarted service can
    /// rehydrate its books up front.
    ///
    /// # Errors
    /// Returns `PersistenceFailed` when the listing does not complete.
    fn assets(&self) -> Result<Vec<AssetId>>;
}

/// In-memory store, the default for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: Mutex<HashMap<AssetId, Vec<Order>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assets with a stored snapshot.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.books.lock().len()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, asset_id: &AssetId, orders: &[Order]) -> Result<()> {
        self.books
            .lock()
            .insert(asset_id.clone(), orders.to_vec());
        Ok(())
    }

    fn load(&self, asset_id: &AssetId) -> Result<Vec<Order>> {
        Ok(self
            .books
            .lock()
            .get(asset_id)
            .cloned()
            .unwrap_or_default())
    }

    fn assets(&self) -> Result<Vec<AssetId>> {
        Ok(self.books.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use tokmatch_types::Side;

    use super::*;

    #[test]
    fn unknown_asset_loads_empty() {
        let store = MemoryStore::new();
        let orders = store.load(&AssetId::new("IPNFT-NEW")).unwrap();
        assert!(orders.is_empty());
        assert_eq!(store.asset_count(), 0);
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let store = MemoryStore::new();
        let asset = AssetId::new("IPNFT-TEST");

        let first = vec![Order::dummy(Side::Buy, 100, 5, 0)];
        store.save(&asset, &first).unwrap();
        assert_eq!(store.load(&asset).unwrap().len(), 1);

        let second = vec![
            Order::dummy(Side::Buy, 100, 5, 0),
            Order::dummy(Side::Sell, 105, 2, 1),
        ];
        store.save(&asset, &second).unwrap();
        let loaded = store.load(&asset).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].price, 105);
    }

    #[test]
    fn assets_are_isolated() {
        let store = MemoryStore::new();
        store
            .save(&AssetId::new("IPNFT-A"), &[Order::dummy(Side::Buy, 1, 1, 0)])
            .unwrap();
        assert!(store.load(&AssetId::new("IPNFT-B")).unwrap().is_empty());
        assert_eq!(store.asset_count(), 1);
    }

    #[test]
    fn assets_lists_every_stored_snapshot() {
        let store = MemoryStore::new();
        assert!(store.assets().unwrap().is_empty());

        store
            .save(&AssetId::new("IPNFT-A"), &[Order::dummy(Side::Buy, 1, 1, 0)])
            .unwrap();
        store
            .save(&AssetId::new("IPNFT-B"), &[Order::dummy(Side::Sell, 2, 1, 0)])
            .unwrap();

        let mut assets = store.assets().unwrap();
        assets.sort();
        assert_eq!(assets, vec![AssetId::new("IPNFT-A"), AssetId::new("IPNFT-B")]);
    }
}
