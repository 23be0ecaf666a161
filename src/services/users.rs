use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::entities::user::{self, Column as UserColumn, Entity as User};
use crate::errors::ServiceError;

/// Fields accepted at registration.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub phone: Option<String>,
    pub legal_declaration: bool,
}

/// Partial profile update; unset fields keep their previous values.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub phone: Option<String>,
    pub document_url: Option<String>,
}

/// Account management for vendors and administrators.
pub struct UserService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db_pool, auth }
    }

    /// Register a vendor account. Emails are unique.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<user::Model, ServiceError> {
        let db = &*self.db_pool;

        let email = input.email.trim().to_ascii_lowercase();
        if email.is_empty() {
            return Err(ServiceError::ValidationError(
                "Email is required".to_string(),
            ));
        }
        if input.password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let existing = User::find()
            .filter(UserColumn::Email.eq(&email))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(
                "Email already registered".to_string(),
            ));
        }

        let password_hash = self
            .auth
            .hash_password(&input.password)
            .map_err(|e| ServiceError::HashError(e.to_string()))?;

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            name: Set(input.name.trim().to_string()),
            business_name: Set(input.business_name),
            business_address: Set(input.business_address),
            phone: Set(input.phone),
            document_url: Set(None),
            is_admin: Set(false),
            documents_verified: Set(false),
            legal_declaration: Set(input.legal_declaration),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(db).await?;

        info!(user_id = %created.id, "Vendor registered");

        Ok(created)
    }

    /// Verify credentials. Wrong email and wrong password are
    /// indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        let db = &*self.db_pool;

        let account = User::find()
            .filter(UserColumn::Email.eq(email.trim().to_ascii_lowercase()))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        self.auth
            .verify_password(password, &account.password_hash)
            .map_err(|_| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        Ok(account)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        let db = &*self.db_pool;
        User::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Partial profile update.
    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<user::Model, ServiceError> {
        let existing = self.get_user(id).await?;

        let db = &*self.db_pool;
        let mut model: user::ActiveModel = existing.into();

        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(business_name) = input.business_name {
            model.business_name = Set(Some(business_name));
        }
        if let Some(business_address) = input.business_address {
            model.business_address = Set(Some(business_address));
        }
        if let Some(phone) = input.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(document_url) = input.document_url {
            model.document_url = Set(Some(document_url));
        }

        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(db).await?)
    }

    /// Change password after re-verifying the current one.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let existing = self.get_user(id).await?;

        self.auth
            .verify_password(current_password, &existing.password_hash)
            .map_err(|_| ServiceError::Unauthorized("Current password is incorrect".to_string()))?;

        if new_password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let password_hash = self
            .auth
            .hash_password(new_password)
            .map_err(|e| ServiceError::HashError(e.to_string()))?;

        let db = &*self.db_pool;
        let mut model: user::ActiveModel = existing.into();
        model.password_hash = Set(password_hash);
        model.updated_at = Set(Some(Utc::now()));
        model.update(db).await?;

        info!(user_id = %id, "Password changed");

        Ok(())
    }

    /// All accounts, newest first (admin listing).
    pub async fn list_users(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<user::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let paginator = User::find()
            .order_by_desc(UserColumn::CreatedAt)
            .paginate(db, limit.clamp(1, 100));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.max(1) - 1).await?;

        Ok((items, total))
    }

    /// Admin review outcome for a vendor's verification documents.
    #[instrument(skip(self))]
    pub async fn set_documents_verified(
        &self,
        id: Uuid,
        verified: bool,
    ) -> Result<user::Model, ServiceError> {
        let existing = self.get_user(id).await?;

        let db = &*self.db_pool;
        let mut model: user::ActiveModel = existing.into();
        model.documents_verified = Set(verified);
        model.updated_at = Set(Some(Utc::now()));

        let updated = model.update(db).await?;

        info!(user_id = %id, verified, "Vendor verification updated");

        Ok(updated)
    }

    /// Remove an account; owned products and the Shopify connection cascade.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_user(id).await?;

        let db = &*self.db_pool;
        existing.delete(db).await?;

        info!(user_id = %id, "User deleted");

        Ok(())
    }
}
