pub mod bucket;
pub mod farmers;
pub mod orders;
pub mod products;
