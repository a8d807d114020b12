use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A transient pool of spawned tasks with a cap on how many run at once.
/// Backpressure is applied at submission: `spawn` waits for a slot, so a
/// tick never holds more than the cap in flight.
pub(crate) struct BoundedPool {
    permits: Arc<Semaphore>,
    tasks: JoinSet<()>,
}

impl BoundedPool {
    pub fn new(max_outstanding: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_outstanding)),
            tasks: JoinSet::new(),
        }
    }

    pub async fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("pool semaphore closed while the pool is alive");
        self.tasks.spawn(async move {
            let _permit = permit;
            task.await;
        });
    }

    /// Wait for every spawned task to finish.
    pub async fn wait(mut self) {
        while self.tasks.join_next().await.is_some() {}
    }
}
