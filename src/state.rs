use std::sync::Arc;

use crate::db::{DbPool, OrmConn};
use crate::store::{
    BucketStore, DbStore, FarmerStore, InventoryStore, MemoryStore, OrderLedger,
};

#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<dyn InventoryStore>,
    pub ledger: Arc<dyn OrderLedger>,
    pub buckets: Arc<dyn BucketStore>,
    pub farmers: Arc<dyn FarmerStore>,
    /// Audit trail pool; absent in the in-memory demo mode.
    pub audit: Option<DbPool>,
}

impl AppState {
    /// Demo mode: every store backed by the same in-process maps.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            inventory: store.clone(),
            ledger: store.clone(),
            buckets: store.clone(),
            farmers: store,
            audit: None,
        }
    }

    pub fn with_database(orm: OrmConn, pool: DbPool) -> Self {
        let store = Arc::new(DbStore::new(orm));
        Self {
            inventory: store.clone(),
            ledger: store.clone(),
            buckets: store.clone(),
            farmers: store,
            audit: Some(pool),
        }
    }
}
