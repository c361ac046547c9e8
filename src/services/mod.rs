pub mod bucket_service;
pub mod catalog_service;
pub mod farmer_service;
pub mod order_service;
pub mod product_service;
