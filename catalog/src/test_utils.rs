use crate::Catalog;
use std::future::Future;
use std::sync::Arc;

/// Helper function to run async property tests with a fresh in-memory store.
/// Creates a new SQLite in-memory database, runs migrations, and passes the
/// resulting catalog to the test function.
/// Panics are treated as test failures.
pub fn test_prop<F, Fut>(f: F)
where
    F: FnOnce(Arc<Catalog>) -> Fut,
    Fut: Future<Output = ()>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    rt.block_on(async {
        let catalog = Catalog::for_test().await;
        f(catalog).await;
    });
}
