pub mod bucket_items;
pub mod farmers;
pub mod orders;
pub mod products;

pub use bucket_items::Entity as BucketItems;
pub use farmers::Entity as Farmers;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
