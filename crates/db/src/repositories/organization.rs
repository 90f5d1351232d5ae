//! Organization repository.
//!
//! Organizations are the root of tenant isolation. Provisioning happens
//! before any request context exists, so `create` establishes its own
//! storage context from the freshly generated ID. Everything else runs
//! under the caller's context like any other repository.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use rentora_core::context::{RequestContext, Role};
use rentora_shared::error::{AppError, AppResult};

use crate::context::set_context;
use crate::coordinator::with_context;
use crate::entities::{organizations, users};
use crate::error::{is_unique_violation, RepoError};
use crate::policy;
use crate::repositories::{not_found, require_admin};

/// Input for provisioning an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganizationInput {
    /// Display name.
    pub name: String,
    /// Unique URL-safe identifier.
    pub slug: String,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Contact phone.
    pub contact_phone: Option<String>,
}

/// Input for updating an organization. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrganizationInput {
    /// New display name.
    pub name: Option<String>,
    /// Contact email; `Some(None)` clears it.
    pub contact_email: Option<Option<String>>,
    /// Contact phone; `Some(None)` clears it.
    pub contact_phone: Option<Option<String>>,
}

/// Organization repository.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Provisions a new organization.
    ///
    /// Runs outside any request context: the transaction scopes itself to
    /// the generated organization ID so the isolation policies admit the
    /// insert. A duplicate slug surfaces as `Conflict` from the unique
    /// index, not from a pre-check (a pre-check could not see other
    /// organizations' rows anyway).
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the slug is taken, or a storage error.
    pub async fn create(&self, input: CreateOrganizationInput) -> AppResult<organizations::Model> {
        let org_id = Uuid::new_v4();
        // Provisioning context: the new organization, acting as its own
        // (not yet existing) administrator.
        let ctx = RequestContext::new(org_id, Uuid::nil(), Role::LandlordAdmin);

        let txn = self.db.begin().await.map_err(crate::storage_error)?;
        set_context(&txn, &ctx).await.map_err(crate::storage_error)?;

        let now = chrono::Utc::now().into();
        let org = organizations::ActiveModel {
            id: Set(org_id),
            name: Set(input.name),
            slug: Set(input.slug.clone()),
            contact_email: Set(input.contact_email),
            contact_phone: Set(input.contact_phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let org = match org.insert(&txn).await {
            Ok(org) => org,
            Err(err) if is_unique_violation(&err) => {
                return Err(AppError::Conflict(format!(
                    "organization slug '{}' is already taken",
                    input.slug
                )));
            }
            Err(err) => return Err(crate::storage_error(err)),
        };

        txn.commit().await.map_err(crate::storage_error)?;
        Ok(org)
    }

    /// Fetches the caller's own organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the organization row is out of scope or
    /// missing, or a storage error.
    pub async fn get(&self, ctx: &RequestContext) -> AppResult<organizations::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                organizations::Entity::find()
                    .filter(policy::organizations_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("organization", ctx.organization_id))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Updates the caller's organization. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the row
    /// is missing, or a storage error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        input: UpdateOrganizationInput,
    ) -> AppResult<organizations::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let org = organizations::Entity::find()
                    .filter(policy::organizations_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("organization", ctx.organization_id))?;

                let mut active: organizations::ActiveModel = org.into();
                if let Some(name) = input.name {
                    active.name = Set(name);
                }
                if let Some(email) = input.contact_email {
                    active.contact_email = Set(email);
                }
                if let Some(phone) = input.contact_phone {
                    active.contact_phone = Set(phone);
                }

                Ok::<_, RepoError>(active.update(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Deactivates the caller's organization and disables all of its
    /// users in the same transaction. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the row
    /// is missing, or a storage error.
    pub async fn deactivate(&self, ctx: &RequestContext) -> AppResult<organizations::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let org = organizations::Entity::find()
                    .filter(policy::organizations_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("organization", ctx.organization_id))?;

                let mut active: organizations::ActiveModel = org.into();
                active.is_active = Set(false);
                let org = active.update(txn).await?;

                // No user of a deactivated organization may authenticate.
                users::Entity::update_many()
                    .col_expr(users::Column::IsActive, Expr::value(false))
                    .filter(policy::users_filter(&ctx))
                    .exec(txn)
                    .await?;

                Ok::<_, RepoError>(org)
            })
        })
        .await
        .map_err(AppError::from)
    }
}
