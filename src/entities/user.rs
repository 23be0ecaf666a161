use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vendor / administrator account
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique login email
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    /// Argon2 password hash, never exposed to clients
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    /// Registered business name
    pub business_name: Option<String>,

    /// Business street address
    pub business_address: Option<String>,

    pub phone: Option<String>,

    /// Reference to an uploaded verification document
    pub document_url: Option<String>,

    pub is_admin: bool,

    /// Set by an administrator after document review
    pub documents_verified: bool,

    /// Vendor accepted the marketplace terms at registration
    pub legal_declaration: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
    #[sea_orm(has_one = "super::shopify_connection::Entity")]
    ShopifyConnection,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::shopify_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopifyConnection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Vendor label shown on exports: business name, falling back to the
    /// display name, falling back to a fixed placeholder.
    pub fn display_label(&self) -> &str {
        match self.business_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                if self.name.trim().is_empty() {
                    "Unknown Vendor"
                } else {
                    &self.name
                }
            }
        }
    }
}
