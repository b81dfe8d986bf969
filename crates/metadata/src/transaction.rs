//! Running closures inside a transaction.

use crate::error::MetadataError;
use crate::repos::Repository;
use crate::store::Datastore;
use futures::future::BoxFuture;

/// Run `f` against a fresh transaction.
///
/// Commits when `f` returns `Ok` and rolls back when it returns `Err`; the
/// closure's error is returned unchanged. A failed rollback is logged and
/// otherwise ignored, since the transaction is discarded either way.
///
/// The closure receives a borrowed repository, so anything it captures must be
/// owned:
///
/// ```ignore
/// let name = name.to_string();
/// let page = run_in_transaction(store, move |repo| {
///     Box::pin(async move { repo.get_page("alice", &name).await })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<T, E, F>(store: &dyn Datastore, f: F) -> Result<T, E>
where
    F: for<'t> FnOnce(&'t mut dyn Repository) -> BoxFuture<'t, Result<T, E>> + Send,
    T: Send,
    E: From<MetadataError> + Send,
{
    let mut tx = store.begin().await?;
    let result = f(tx.repository()).await;
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}
