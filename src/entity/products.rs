use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farmer_id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
    pub area: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: String,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farmers::Entity",
        from = "Column::FarmerId",
        to = "super::farmers::Column::Id"
    )]
    Farmers,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::bucket_items::Entity")]
    BucketItems,
}

impl Related<super::farmers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmers.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::bucket_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BucketItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
