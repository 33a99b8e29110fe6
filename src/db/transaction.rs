/*!
 * Transaction Helper Utilities
 *
 * Provides convenient helpers for database transactions to ensure ACID guarantees
 */

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionError, TransactionTrait};
use std::future::Future;
use std::pin::Pin;

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute a function within a database transaction
///
/// This helper ensures:
/// - Automatic rollback on error
/// - Automatic commit on success
/// - Proper error handling and conversion
///
/// # Example
///
/// ```rust,ignore
/// use crate::db::transaction::with_transaction;
///
/// let result = with_transaction(&db, |txn| {
///     Box::pin(async move {
///         let assignment = AssignmentEntity::insert(assignment_data).exec(txn).await?;
///         AssetEntity::update(status_update).exec(txn).await?;
///         Ok(assignment)
///     })
/// }).await?;
/// ```
pub async fn with_transaction<F, T, E>(db: &DatabaseConnection, f: F) -> Result<T, E>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, Result<T, E>> + Send + 'static,
    T: Send,
    E: From<DbErr> + std::fmt::Debug + Send,
{
    db.transaction(|txn| {
        Box::pin(async move { f(txn).await.map_err(|e| DbErr::Custom(format!("{:?}", e))) })
    })
    .await
    .map_err(|e| match e {
        TransactionError::Connection(db_err) => E::from(db_err),
        TransactionError::Transaction(db_err) => E::from(db_err),
    })
}
