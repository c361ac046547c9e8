use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{BucketItem, Farmer, NewOrder, Order, OrderStatus, Product, ProductStatus};

use super::{BucketStore, FarmerStore, InventoryStore, OrderFilter, OrderLedger, ProductFilter};

/// In-process demo backend. Each product sits behind its own mutex so
/// debits against one product never serialize against another; the outer
/// maps only take a write lock on insert.
pub struct MemoryStore {
    products: RwLock<HashMap<Uuid, Arc<Mutex<Product>>>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    buckets: RwLock<HashMap<Uuid, Vec<BucketItem>>>,
    farmers: RwLock<HashMap<Uuid, Farmer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            orders: RwLock::new(HashMap::new()),
            buckets: RwLock::new(HashMap::new()),
            farmers: RwLock::new(HashMap::new()),
        }
    }

    async fn product_slot(&self, id: Uuid) -> Option<Arc<Mutex<Product>>> {
        self.products.read().await.get(&id).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn insert(&self, product: Product) -> AppResult<Product> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(AppError::DuplicateEntry);
        }
        products.insert(product.id, Arc::new(Mutex::new(product.clone())));
        Ok(product)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Product>> {
        match self.product_slot(id).await {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        let slots: Vec<Arc<Mutex<Product>>> =
            self.products.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for slot in slots {
            let product = slot.lock().await.clone();
            if filter.matches(&product) {
                out.push(product);
            }
        }
        out.sort_by_key(|p| p.created_at);
        Ok(out)
    }

    async fn update(&self, product: Product) -> AppResult<Product> {
        let slot = self
            .product_slot(product.id)
            .await
            .ok_or(AppError::NotFound)?;
        let mut live = slot.lock().await;
        let updated = Product {
            quantity: live.quantity,
            ..product
        };
        *live = updated.clone();
        Ok(updated)
    }

    async fn debit(&self, id: Uuid, amount: i64) -> AppResult<Product> {
        let slot = self.product_slot(id).await.ok_or(AppError::NotFound)?;
        let mut live = slot.lock().await;
        if live.quantity < amount {
            return Err(AppError::InsufficientStock);
        }
        live.quantity -= amount;
        Ok(live.clone())
    }

    async fn credit(&self, id: Uuid, amount: i64) -> AppResult<()> {
        let slot = self.product_slot(id).await.ok_or(AppError::NotFound)?;
        let mut live = slot.lock().await;
        live.quantity += amount;
        Ok(())
    }

    async fn mark_unavailable(&self, id: Uuid) -> AppResult<()> {
        let slot = self.product_slot(id).await.ok_or(AppError::NotFound)?;
        let mut live = slot.lock().await;
        live.status = ProductStatus::Unavailable;
        Ok(())
    }
}

#[async_trait]
impl OrderLedger for MemoryStore {
    async fn append(&self, order: NewOrder) -> AppResult<Order> {
        let record = Order {
            id: Uuid::new_v4(),
            customer_id: order.customer_id,
            product_id: order.product_id,
            farmer_id: order.farmer_id,
            quantity: order.quantity,
            total_price: order.total_price,
            payment_method: order.payment_method,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.orders.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut out: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        out.sort_by_key(|o| o.created_at);
        Ok(out)
    }

    async fn transition_to_successful(&self, id: Uuid) -> AppResult<Order> {
        // Check-and-set under the write lock, so two racing fulfillment
        // attempts cannot both see a pending order.
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(AppError::NotFound)?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::InvalidState);
        }
        order.status = OrderStatus::Successful;
        order.completed_at = Some(Utc::now());
        Ok(order.clone())
    }
}

#[async_trait]
impl BucketStore for MemoryStore {
    async fn get(&self, customer_id: Uuid) -> AppResult<Vec<BucketItem>> {
        Ok(self
            .buckets
            .read()
            .await
            .get(&customer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, customer_id: Uuid, item: BucketItem) -> AppResult<Vec<BucketItem>> {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(customer_id).or_default();
        match bucket.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => existing.quantity += item.quantity,
            None => bucket.push(item),
        }
        Ok(bucket.clone())
    }

    async fn remove(&self, customer_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.get_mut(&customer_id).ok_or(AppError::NotFound)?;
        let before = bucket.len();
        bucket.retain(|i| i.product_id != product_id);
        if bucket.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn clear(&self, customer_id: Uuid) -> AppResult<()> {
        self.buckets.write().await.remove(&customer_id);
        Ok(())
    }
}

#[async_trait]
impl FarmerStore for MemoryStore {
    async fn insert(&self, farmer: Farmer) -> AppResult<Farmer> {
        let mut farmers = self.farmers.write().await;
        if farmers.contains_key(&farmer.id) {
            return Err(AppError::DuplicateEntry);
        }
        farmers.insert(farmer.id, farmer.clone());
        Ok(farmer)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Farmer>> {
        Ok(self.farmers.read().await.get(&id).cloned())
    }
}
