//! Request-context management for multi-tenant isolation.
//!
//! Every data access runs under an immutable [`RequestContext`] bound to a
//! single database transaction. The context is exported to `PostgreSQL` as
//! `SET LOCAL` session variables so row-level security policies see the
//! same organization boundary the application enforces.
//!
//! # Usage
//!
//! ```ignore
//! use rentora_db::context::ScopedConnectionExt;
//!
//! // In your handler or middleware:
//! let scoped = db.with_context(&ctx).await?;
//!
//! // Use scoped.transaction() for all queries
//! let tickets = Ticket::find().all(scoped.transaction()).await?;
//!
//! // Commit when done
//! scoped.commit().await?;
//! ```

use rentora_core::context::RequestContext;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// A database connection wrapper that binds one request context to one
/// transaction.
///
/// Begins a transaction and sets the `app.current_organization_id`,
/// `app.current_user_id`, and `app.current_user_role` session variables
/// with `SET LOCAL`, scoping them to the transaction. Row-level security
/// policies key off these to enforce the organization boundary even if an
/// application-side filter is wrong.
pub struct ScopedConnection {
    txn: DatabaseTransaction,
    ctx: RequestContext,
}

impl ScopedConnection {
    /// Creates a new scoped connection for the given request context.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the
    /// session variables cannot be set.
    pub async fn begin(db: &DatabaseConnection, ctx: &RequestContext) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_context(&txn, ctx).await?;
        Ok(Self { txn, ctx: *ctx })
    }

    /// Returns a reference to the underlying transaction for executing
    /// queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Returns the request context this connection is bound to.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Sets the context session variables on an existing transaction.
///
/// Use this when you already have a transaction and need to bind a context
/// to it. `SET LOCAL` scopes the variables to the transaction; they reset
/// on commit or rollback.
///
/// # Errors
///
/// Returns an error if the session variables cannot be set.
pub async fn set_context(txn: &DatabaseTransaction, ctx: &RequestContext) -> Result<(), DbErr> {
    // UUIDs and the role name come from typed values, not request input,
    // so string interpolation here cannot inject.
    let sql = format!(
        "SET LOCAL app.current_organization_id = '{org}'; \
         SET LOCAL app.current_user_id = '{user}'; \
         SET LOCAL app.current_user_role = '{role}'",
        org = ctx.organization_id,
        user = ctx.user_id,
        role = ctx.role.as_str(),
    );
    txn.execute_unprepared(&sql).await?;
    Ok(())
}

/// Extension trait for `DatabaseConnection` to create scoped connections.
#[async_trait::async_trait]
pub trait ScopedConnectionExt {
    /// Creates a scoped connection bound to the given request context.
    ///
    /// # Errors
    ///
    /// Returns an error if the scoped connection cannot be created.
    async fn with_context(&self, ctx: &RequestContext) -> Result<ScopedConnection, DbErr>;
}

#[async_trait::async_trait]
impl ScopedConnectionExt for DatabaseConnection {
    async fn with_context(&self, ctx: &RequestContext) -> Result<ScopedConnection, DbErr> {
        ScopedConnection::begin(self, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use rentora_core::context::{RequestContext, Role};
    use uuid::Uuid;

    // Note: transaction behavior requires a real PostgreSQL database and
    // is covered by the integration tests.

    #[test]
    fn test_context_sql_format() {
        let org = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let user = Uuid::parse_str("018f3a2b-0000-7000-8000-000000000001").unwrap();
        let ctx = RequestContext {
            organization_id: org,
            user_id: user,
            role: Role::Tenant,
        };
        let sql = format!(
            "SET LOCAL app.current_organization_id = '{org}'; \
             SET LOCAL app.current_user_id = '{user}'; \
             SET LOCAL app.current_user_role = '{role}'",
            org = ctx.organization_id,
            user = ctx.user_id,
            role = ctx.role.as_str(),
        );
        assert!(sql.contains("app.current_organization_id = '550e8400"));
        assert!(sql.contains("app.current_user_role = 'tenant'"));
    }
}
