use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default listing status for vendor-created products.
pub const DEFAULT_STATUS: &str = "active";

/// Product listing entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning vendor
    pub vendor_id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// Free-text category, not a foreign key
    #[validate(length(
        min = 1,
        max = 255,
        message = "Category must be between 1 and 255 characters"
    ))]
    pub category: String,

    #[validate(length(max = 5000, message = "Description cannot exceed 5000 characters"))]
    pub description: String,

    pub price: Decimal,

    pub quantity: i32,

    /// Whether the vendor offers delivery (drives the bulk-import
    /// requires-shipping column)
    pub delivery: bool,

    pub pickup_location: Option<String>,

    /// JSON array of image URIs, stored serialized so malformed data
    /// degrades at parse time
    #[sea_orm(column_type = "Text")]
    pub images: String,

    /// JSON array of size options, or NULL
    #[sea_orm(column_type = "Text", nullable)]
    pub sizes: Option<String>,

    /// JSON array of color options, or NULL
    #[sea_orm(column_type = "Text", nullable)]
    pub colors: Option<String>,

    pub status: String,

    pub sku: Option<String>,

    /// Identifier assigned by the remote commerce platform after a sync
    pub shopify_product_id: Option<String>,

    pub last_synced_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VendorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Vendor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(DEFAULT_STATUS.to_string());
            }
            if let ActiveValue::NotSet = active_model.images {
                active_model.images = Set("[]".to_string());
            }
            active_model.created_at = Set(Utc::now());
        }

        active_model.updated_at = Set(Some(Utc::now()));

        let model: Model = active_model.clone().try_into().map_err(|_| {
            DbErr::Custom("Failed to convert ActiveModel to Model for validation".to_string())
        })?;

        if let Err(err) = model.validate() {
            return Err(DbErr::Custom(format!("Validation error: {}", err)));
        }

        Ok(active_model)
    }
}
