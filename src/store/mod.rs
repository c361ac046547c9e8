use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{BucketItem, Farmer, GeoPoint, NewOrder, Order, OrderStatus, Product, ProductStatus};

pub mod db;
pub mod memory;

pub use db::DbStore;
pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy)]
pub struct GeoFence {
    pub center: GeoPoint,
    pub radius_km: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub farmer_id: Option<Uuid>,
    /// Radius query; products without a location never match.
    pub within: Option<GeoFence>,
    /// Drop products whose expiry marker is before this instant.
    pub not_expired_at: Option<DateTime<Utc>>,
}

impl ProductFilter {
    pub fn available() -> Self {
        Self {
            status: Some(ProductStatus::Available),
            ..Default::default()
        }
    }

    /// In-process evaluation of the filter, used by the in-memory backend.
    /// The database backend compiles the same predicate into SQL.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(status) = self.status {
            if product.status != status {
                return false;
            }
        }
        if let Some(farmer_id) = self.farmer_id {
            if product.farmer_id != Some(farmer_id) {
                return false;
            }
        }
        if let Some(fence) = &self.within {
            match &product.location {
                Some(loc) => {
                    if fence.center.distance_km(loc) > fence.radius_km {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if let Some(cutoff) = self.not_expired_at {
            if product.is_expired(cutoff) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub farmer_id: Option<Uuid>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(customer_id) = self.customer_id {
            if order.customer_id != Some(customer_id) {
                return false;
            }
        }
        if let Some(farmer_id) = self.farmer_id {
            if order.farmer_id != Some(farmer_id) {
                return false;
            }
        }
        true
    }
}

/// Product records and their contended quantity field. Quantity only ever
/// moves through `debit`/`credit`; `update` leaves it untouched.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// `DuplicateEntry` when a product with the same id already exists.
    async fn insert(&self, product: Product) -> AppResult<Product>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// Filtered listing in `created_at` order.
    async fn list(&self, filter: ProductFilter) -> AppResult<Vec<Product>>;

    /// Replace the descriptive fields of a product. The live quantity is
    /// preserved so a stale edit cannot clobber a concurrent debit.
    async fn update(&self, product: Product) -> AppResult<Product>;

    /// Atomic compare-and-decrement with a floor of zero. Returns the updated
    /// snapshot, `InsufficientStock` when the floor would be crossed, or
    /// `NotFound`.
    async fn debit(&self, id: Uuid, amount: i64) -> AppResult<Product>;

    /// Compensating restore for a debit whose order could not be recorded.
    async fn credit(&self, id: Uuid, amount: i64) -> AppResult<()>;

    /// Soft delete: products are never removed, their status flips instead.
    async fn mark_unavailable(&self, id: Uuid) -> AppResult<()>;
}

/// Committed orders. Appends need no cross-order synchronization; the
/// pending -> successful transition is an atomic check-and-set per order.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Assigns id and creation timestamp; status always starts `pending`.
    async fn append(&self, order: NewOrder) -> AppResult<Order>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Filtered listing in `created_at` order.
    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<Order>>;

    /// Stamps `completed_at` and moves the order out of the pending set.
    /// `InvalidState` when the order is not currently pending, so a duplicate
    /// fulfillment attempt can never resurrect or double-complete an order.
    async fn transition_to_successful(&self, id: Uuid) -> AppResult<Order>;
}

/// Cart drafts. A bucket has no stock effect until checkout.
#[async_trait]
pub trait BucketStore: Send + Sync {
    async fn get(&self, customer_id: Uuid) -> AppResult<Vec<BucketItem>>;

    /// Adding a product already in the bucket merges the quantities.
    async fn add(&self, customer_id: Uuid, item: BucketItem) -> AppResult<Vec<BucketItem>>;

    async fn remove(&self, customer_id: Uuid, product_id: Uuid) -> AppResult<()>;

    async fn clear(&self, customer_id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait FarmerStore: Send + Sync {
    /// `DuplicateEntry` when the id already exists.
    async fn insert(&self, farmer: Farmer) -> AppResult<Farmer>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Farmer>>;
}
