//! Transaction coordinator for atomic multi-entity operations.
//!
//! Composite flows (terminating a contract, accepting an invitation,
//! deleting a building) touch several tables and must commit or roll back
//! as a unit. [`with_context`] runs a closure inside one context-bound
//! transaction: commit on `Ok`, rollback on `Err`, rollback on panic via
//! the transaction's drop guard.

use std::future::Future;
use std::pin::Pin;

use rentora_core::context::RequestContext;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

use crate::context::set_context;

/// A boxed future as returned by coordinator closures.
pub type CoordinatorFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// Runs `f` inside a single transaction bound to the request context.
///
/// The context session variables are set with `SET LOCAL` before `f` runs,
/// so row-level security applies to every statement in the closure. The
/// transaction commits if `f` returns `Ok` and rolls back if it returns
/// `Err`; partial effects are never visible to other transactions.
///
/// # Errors
///
/// Returns the closure's error, or the storage error from beginning,
/// binding, or committing the transaction (converted through `E::from`).
///
/// # Example
///
/// ```ignore
/// let ticket = with_context(&db, &ctx, |txn| {
///     Box::pin(async move {
///         let ticket = create_ticket(txn, input).await?;
///         attach_document(txn, ticket.id, meta).await?;
///         Ok(ticket)
///     })
/// })
/// .await?;
/// ```
pub async fn with_context<F, T, E>(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    f: F,
) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> CoordinatorFuture<'c, T, E>,
    E: From<DbErr>,
{
    let txn = db.begin().await.map_err(E::from)?;
    set_context(&txn, ctx).await.map_err(E::from)?;

    match f(&txn).await {
        Ok(value) => {
            txn.commit().await.map_err(E::from)?;
            Ok(value)
        }
        Err(err) => {
            // Rollback failure is secondary to the original error; the
            // connection is returned to the pool and reset either way.
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}
