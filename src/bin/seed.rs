use chrono::Utc;
use uuid::Uuid;

use kisan_kart_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    error::AppError,
    models::{Farmer, GeoPoint, Product, ProductStatus},
    state::AppState,
};

// Fixed ids so re-running the seed is a no-op.
const NASHIK_FARMER: u128 = 0x1001;
const PUNJAB_FARMER: u128 = 0x1002;
const TOMATOES: u128 = 0x2001;
const BASMATI: u128 = 0x2002;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let database_url = config
        .database_url
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set to seed the database"))?;

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&database_url).await?;
    let state = AppState::with_database(orm, pool);

    let nashik = GeoPoint {
        latitude: 19.9975,
        longitude: 73.7898,
    };
    let punjab = GeoPoint {
        latitude: 31.1471,
        longitude: 75.3412,
    };

    seed_farmer(
        &state,
        Farmer {
            id: Uuid::from_u128(NASHIK_FARMER),
            name: "Nashik Demo Farm".into(),
            phone_number: "+91-9000000001".into(),
            location: nashik,
            bio: Some("Family-run vegetable farm near Nashik.".into()),
            profile_picture: Some("background.png".into()),
            created_at: Utc::now(),
        },
    )
    .await?;

    seed_farmer(
        &state,
        Farmer {
            id: Uuid::from_u128(PUNJAB_FARMER),
            name: "Punjab Demo Farm".into(),
            phone_number: "+91-9000000002".into(),
            location: punjab,
            bio: Some("Rice growers from the fields of Punjab.".into()),
            profile_picture: Some("background2.png".into()),
            created_at: Utc::now(),
        },
    )
    .await?;

    seed_product(
        &state,
        Product {
            id: Uuid::from_u128(TOMATOES),
            farmer_id: Some(Uuid::from_u128(NASHIK_FARMER)),
            name: "Fresh Organic Tomatoes".into(),
            category: "Vegetables".into(),
            price: 40.0,
            quantity: 20,
            area: "Nashik".into(),
            description: Some(
                "Farm-fresh ripe tomatoes, perfect for salads and cooking.".into(),
            ),
            image: Some("background.png".into()),
            status: ProductStatus::Available,
            expires_at: None,
            location: Some(nashik),
            created_at: Utc::now(),
        },
    )
    .await?;

    seed_product(
        &state,
        Product {
            id: Uuid::from_u128(BASMATI),
            farmer_id: Some(Uuid::from_u128(PUNJAB_FARMER)),
            name: "Basmati Rice".into(),
            category: "Grains".into(),
            price: 120.0,
            quantity: 50,
            area: "Punjab".into(),
            description: Some(
                "Long-grain aromatic basmati rice from the fields of Punjab.".into(),
            ),
            image: Some("background2.png".into()),
            status: ProductStatus::Available,
            expires_at: None,
            location: Some(punjab),
            created_at: Utc::now(),
        },
    )
    .await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_farmer(state: &AppState, farmer: Farmer) -> anyhow::Result<()> {
    let name = farmer.name.clone();
    match state.farmers.insert(farmer).await {
        Ok(_) => println!("Seeded farmer {name}"),
        Err(AppError::DuplicateEntry) => println!("Farmer {name} already present"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn seed_product(state: &AppState, product: Product) -> anyhow::Result<()> {
    let name = product.name.clone();
    match state.inventory.insert(product).await {
        Ok(_) => println!("Seeded product {name}"),
        Err(AppError::DuplicateEntry) => println!("Product {name} already present"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
