//! User repository.
//!
//! Users are visible organization-wide to both roles; creation and
//! deactivation are admin-only. Tenant users are normally created through
//! the invitation flow, but an admin may also create them directly.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use rentora_core::context::{RequestContext, Role};
use rentora_shared::error::{AppError, AppResult};
use rentora_shared::types::{PageRequest, PageResponse};

use crate::coordinator::with_context;
use crate::entities::users;
use crate::error::{is_unique_violation, RepoError};
use crate::policy;
use crate::repositories::{not_found, require_admin};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Unique email address.
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Role within the organization.
    pub role: Role,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user in the caller's organization. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `Conflict` if the
    /// email is taken, or a storage error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> AppResult<users::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let now = chrono::Utc::now().into();
                let user = users::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    email: Set(input.email.clone()),
                    full_name: Set(input.full_name),
                    role: Set(input.role.into()),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                match user.insert(txn).await {
                    Ok(user) => Ok::<_, RepoError>(user),
                    Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(format!(
                        "email '{}' is already registered",
                        input.email
                    ))
                    .into()),
                    Err(err) => Err(err.into()),
                }
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Fetches one user in the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user is out of scope or missing, or a
    /// storage error.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<users::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                users::Entity::find_by_id(id)
                    .filter(policy::users_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("user", id))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists users in the caller's organization, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<users::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let query = users::Entity::find().filter(policy::users_filter(&ctx));

                let total = query.clone().count(txn).await?;
                let data = query
                    .order_by_desc(users::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(txn)
                    .await?;

                Ok::<_, RepoError>(PageResponse::new(data, &page, total))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Deactivates a user. Admin-only. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// user is out of scope or missing, or a storage error.
    pub async fn deactivate(&self, ctx: &RequestContext, id: Uuid) -> AppResult<users::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let user = users::Entity::find_by_id(id)
                    .filter(policy::users_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("user", id))?;

                let mut active: users::ActiveModel = user.into();
                active.is_active = Set(false);
                Ok::<_, RepoError>(active.update(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }
}
