use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bucket::{AddBucketItemRequest, BucketLine, BucketView, CheckoutRequest, CheckoutResponse},
        farmers::RegisterFarmerRequest,
        orders::{OrderList, PlaceOrderRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{BucketItem, Farmer, GeoPoint, Order, OrderStatus, Product, ProductStatus},
    response::{ApiResponse, Meta},
    routes::{bucket, farmers, health, orders, products},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        farmers::register_farmer,
        farmers::get_farmer,
        farmers::list_farmer_products,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::fulfill_order,
        bucket::view_bucket,
        bucket::add_to_bucket,
        bucket::remove_from_bucket,
        bucket::checkout,
    ),
    components(
        schemas(
            GeoPoint,
            Product,
            ProductStatus,
            Order,
            OrderStatus,
            BucketItem,
            Farmer,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            RegisterFarmerRequest,
            PlaceOrderRequest,
            OrderList,
            AddBucketItemRequest,
            CheckoutRequest,
            BucketLine,
            BucketView,
            CheckoutResponse,
            Meta,
            health::HealthData,
            ApiResponse<health::HealthData>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<BucketView>,
            ApiResponse<Farmer>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog and crop listings"),
        (name = "Farmers", description = "Farmer profiles"),
        (name = "Orders", description = "Order placement and fulfillment"),
        (name = "Bucket", description = "Cart drafts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
