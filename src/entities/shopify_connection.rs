use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Remote-platform credentials for one vendor. Exactly one row per vendor
/// (unique index); disconnecting deactivates the row, it is never deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopify_connections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub vendor_id: Uuid,

    /// Store domain, e.g. `my-store.myshopify.com`
    pub store_url: String,

    /// Admin API access token. Never serialized into responses.
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub access_token: String,

    pub active: bool,

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

impl ActiveModelBehavior for ActiveModel {}
