use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::db::OrmConn;
use crate::entity::{
    bucket_items::{
        ActiveModel as BucketActive, Column as BucketCol, Entity as BucketItems,
        Model as BucketModel,
    },
    farmers::{ActiveModel as FarmerActive, Model as FarmerModel},
    orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    products::{
        ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel,
    },
    Farmers,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    BucketItem, Farmer, GeoPoint, NewOrder, Order, OrderStatus, Product, ProductStatus,
};

use super::{BucketStore, FarmerStore, InventoryStore, OrderFilter, OrderLedger, ProductFilter};

/// Haversine distance in kilometers, evaluated by Postgres so the radius
/// filter stays inside the database. Binds: lat, lng, lat, radius_km.
const HAVERSINE_KM_SQL: &str = "(6371.0 * acos(least(1.0, \
     cos(radians(?)) * cos(radians(latitude)) * cos(radians(longitude) - radians(?)) \
     + sin(radians(?)) * sin(radians(latitude))))) <= ?";

/// Postgres backend. Stock movement is a single filtered UPDATE, so the
/// compare-and-decrement happens inside the database.
pub struct DbStore {
    conn: OrmConn,
}

impl DbStore {
    pub fn new(conn: OrmConn) -> Self {
        Self { conn }
    }

    async fn load_bucket(&self, customer_id: Uuid) -> AppResult<Vec<BucketItem>> {
        let items = BucketItems::find()
            .filter(BucketCol::CustomerId.eq(customer_id))
            .order_by_asc(BucketCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(bucket_item_from_entity)
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl InventoryStore for DbStore {
    async fn insert(&self, product: Product) -> AppResult<Product> {
        match product_to_active(&product).insert(&self.conn).await {
            Ok(model) => product_from_entity(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::DuplicateEntry),
                _ => Err(err.into()),
            },
        }
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Product>> {
        let model = Products::find_by_id(id).one(&self.conn).await?;
        model.map(product_from_entity).transpose()
    }

    async fn list(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(ProdCol::Status.eq(status.as_str()));
        }
        if let Some(farmer_id) = filter.farmer_id {
            condition = condition.add(ProdCol::FarmerId.eq(farmer_id));
        }
        if let Some(cutoff) = filter.not_expired_at {
            condition = condition.add(
                Condition::any()
                    .add(ProdCol::ExpiresAt.is_null())
                    .add(ProdCol::ExpiresAt.gte(cutoff)),
            );
        }
        if let Some(fence) = filter.within {
            condition = condition
                .add(ProdCol::Latitude.is_not_null())
                .add(ProdCol::Longitude.is_not_null())
                .add(Expr::cust_with_values(
                    HAVERSINE_KM_SQL,
                    [
                        fence.center.latitude,
                        fence.center.longitude,
                        fence.center.latitude,
                        fence.radius_km,
                    ],
                ));
        }

        Products::find()
            .filter(condition)
            .order_by_asc(ProdCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect()
    }

    async fn update(&self, product: Product) -> AppResult<Product> {
        let mut active = product_to_active(&product);
        // Quantity moves only through debit/credit.
        active.quantity = NotSet;
        match active.update(&self.conn).await {
            Ok(model) => product_from_entity(model),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    async fn debit(&self, id: Uuid, amount: i64) -> AppResult<Product> {
        let result = Products::update_many()
            .col_expr(ProdCol::Quantity, Expr::col(ProdCol::Quantity).sub(amount))
            .filter(ProdCol::Id.eq(id))
            .filter(ProdCol::Quantity.gte(amount))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return match Products::find_by_id(id).one(&self.conn).await? {
                Some(_) => Err(AppError::InsufficientStock),
                None => Err(AppError::NotFound),
            };
        }

        let model = Products::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(AppError::NotFound)?;
        product_from_entity(model)
    }

    async fn credit(&self, id: Uuid, amount: i64) -> AppResult<()> {
        let result = Products::update_many()
            .col_expr(ProdCol::Quantity, Expr::col(ProdCol::Quantity).add(amount))
            .filter(ProdCol::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn mark_unavailable(&self, id: Uuid) -> AppResult<()> {
        let result = Products::update_many()
            .col_expr(
                ProdCol::Status,
                Expr::value(ProductStatus::Unavailable.as_str()),
            )
            .filter(ProdCol::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderLedger for DbStore {
    async fn append(&self, order: NewOrder) -> AppResult<Order> {
        let active = OrderActive {
            id: Set(Uuid::new_v4()),
            customer_id: Set(order.customer_id),
            product_id: Set(order.product_id),
            farmer_id: Set(order.farmer_id),
            quantity: Set(order.quantity),
            total_price: Set(order.total_price),
            payment_method: Set(order.payment_method),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            created_at: Set(Utc::now().into()),
            completed_at: Set(None),
        };
        match active.insert(&self.conn).await {
            Ok(model) => order_from_entity(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::DuplicateEntry),
                _ => Err(err.into()),
            },
        }
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Order>> {
        let model = Orders::find_by_id(id).one(&self.conn).await?;
        model.map(order_from_entity).transpose()
    }

    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(OrderCol::Status.eq(status.as_str()));
        }
        if let Some(customer_id) = filter.customer_id {
            condition = condition.add(OrderCol::CustomerId.eq(customer_id));
        }
        if let Some(farmer_id) = filter.farmer_id {
            condition = condition.add(OrderCol::FarmerId.eq(farmer_id));
        }

        Orders::find()
            .filter(condition)
            .order_by_asc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect()
    }

    async fn transition_to_successful(&self, id: Uuid) -> AppResult<Order> {
        // Single filtered UPDATE: only a currently-pending row transitions,
        // so concurrent duplicate fulfillments lose the race cleanly.
        let result = Orders::update_many()
            .col_expr(
                OrderCol::Status,
                Expr::value(OrderStatus::Successful.as_str()),
            )
            .col_expr(OrderCol::CompletedAt, Expr::value(Utc::now()))
            .filter(OrderCol::Id.eq(id))
            .filter(OrderCol::Status.eq(OrderStatus::Pending.as_str()))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return match Orders::find_by_id(id).one(&self.conn).await? {
                Some(_) => Err(AppError::InvalidState),
                None => Err(AppError::NotFound),
            };
        }

        let model = Orders::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(AppError::NotFound)?;
        order_from_entity(model)
    }
}

#[async_trait]
impl BucketStore for DbStore {
    async fn get(&self, customer_id: Uuid) -> AppResult<Vec<BucketItem>> {
        self.load_bucket(customer_id).await
    }

    async fn add(&self, customer_id: Uuid, item: BucketItem) -> AppResult<Vec<BucketItem>> {
        let existing = BucketItems::find_by_id((customer_id, item.product_id))
            .one(&self.conn)
            .await?;

        match existing {
            Some(row) => {
                let merged = row.quantity + item.quantity;
                let mut active: BucketActive = row.into();
                active.quantity = Set(merged);
                active.update(&self.conn).await?;
            }
            None => {
                BucketActive {
                    customer_id: Set(customer_id),
                    product_id: Set(item.product_id),
                    quantity: Set(item.quantity),
                    created_at: Set(Utc::now().into()),
                }
                .insert(&self.conn)
                .await?;
            }
        }

        self.load_bucket(customer_id).await
    }

    async fn remove(&self, customer_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let result = BucketItems::delete_many()
            .filter(BucketCol::CustomerId.eq(customer_id))
            .filter(BucketCol::ProductId.eq(product_id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn clear(&self, customer_id: Uuid) -> AppResult<()> {
        BucketItems::delete_many()
            .filter(BucketCol::CustomerId.eq(customer_id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FarmerStore for DbStore {
    async fn insert(&self, farmer: Farmer) -> AppResult<Farmer> {
        let active = FarmerActive {
            id: Set(farmer.id),
            name: Set(farmer.name.clone()),
            phone_number: Set(farmer.phone_number.clone()),
            latitude: Set(farmer.location.latitude),
            longitude: Set(farmer.location.longitude),
            bio: Set(farmer.bio.clone()),
            profile_picture: Set(farmer.profile_picture.clone()),
            created_at: Set(farmer.created_at.into()),
        };
        match active.insert(&self.conn).await {
            Ok(model) => Ok(farmer_from_entity(model)),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::DuplicateEntry),
                _ => Err(err.into()),
            },
        }
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Farmer>> {
        let model = Farmers::find_by_id(id).one(&self.conn).await?;
        Ok(model.map(farmer_from_entity))
    }
}

fn product_from_entity(model: ProductModel) -> AppResult<Product> {
    let status = ProductStatus::parse(&model.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown product status {}", model.status))
    })?;
    let location = match (model.latitude, model.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };
    Ok(Product {
        id: model.id,
        farmer_id: model.farmer_id,
        name: model.name,
        category: model.category,
        price: model.price,
        quantity: model.quantity,
        area: model.area,
        description: model.description,
        image: model.image,
        status,
        expires_at: model.expires_at.map(|dt| dt.with_timezone(&chrono::Utc)),
        location,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    })
}

fn product_to_active(product: &Product) -> ProductActive {
    ProductActive {
        id: Set(product.id),
        farmer_id: Set(product.farmer_id),
        name: Set(product.name.clone()),
        category: Set(product.category.clone()),
        price: Set(product.price),
        quantity: Set(product.quantity),
        area: Set(product.area.clone()),
        description: Set(product.description.clone()),
        image: Set(product.image.clone()),
        status: Set(product.status.as_str().to_string()),
        expires_at: Set(product.expires_at.map(Into::into)),
        latitude: Set(product.location.map(|l| l.latitude)),
        longitude: Set(product.location.map(|l| l.longitude)),
        created_at: Set(product.created_at.into()),
    }
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = OrderStatus::parse(&model.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown order status {}", model.status))
    })?;
    Ok(Order {
        id: model.id,
        customer_id: model.customer_id,
        product_id: model.product_id,
        farmer_id: model.farmer_id,
        quantity: model.quantity,
        total_price: model.total_price,
        payment_method: model.payment_method,
        status,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        completed_at: model.completed_at.map(|dt| dt.with_timezone(&chrono::Utc)),
    })
}

fn bucket_item_from_entity(model: BucketModel) -> BucketItem {
    BucketItem {
        product_id: model.product_id,
        quantity: model.quantity,
    }
}

fn farmer_from_entity(model: FarmerModel) -> Farmer {
    Farmer {
        id: model.id,
        name: model.name,
        phone_number: model.phone_number,
        location: GeoPoint {
            latitude: model.latitude,
            longitude: model.longitude,
        },
        bio: model.bio,
        profile_picture: model.profile_picture,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}
