//! Periodic background tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use trellis_core::Client;

use crate::handler::BoxFuture;

type TaskFn = Arc<dyn Fn(Arc<dyn Client>) -> BoxFuture<'static, ()> + Send + Sync>;

struct Task {
    interval: Duration,
    run: TaskFn,
}

/// Registered periodic tasks, spawned once at startup.
///
/// Each task runs immediately and then on its interval until the set is
/// cancelled.
pub struct TaskSet {
    tasks: Vec<Task>,
    token: CancellationToken,
}

impl Default for TaskSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            token: CancellationToken::new(),
        }
    }

    /// Registers a task to run every `interval_secs` seconds.
    pub fn add<F, Fut>(&mut self, interval_secs: u64, f: F)
    where
        F: Fn(Arc<dyn Client>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.tasks.push(Task {
            interval: Duration::from_secs(interval_secs),
            run: Arc::new(move |client| Box::pin(f(client))),
        });
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the set holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawns one tokio task per registration. The handles finish when the
    /// set is cancelled.
    pub fn spawn_all(&self, client: Arc<dyn Client>) -> Vec<JoinHandle<()>> {
        self.tasks
            .iter()
            .map(|task| {
                let run = Arc::clone(&task.run);
                let client = Arc::clone(&client);
                let token = self.token.clone();
                let period = task.interval;
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(period);
                    loop {
                        tokio::select! {
                            _ = token.cancelled() => {
                                debug!("periodic task stopped");
                                break;
                            }
                            _ = interval.tick() => run(Arc::clone(&client)).await,
                        }
                    }
                })
            })
            .collect()
    }

    /// Stops every spawned task.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::RecordingClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn tasks_run_on_their_interval_until_cancelled() {
        static TICKS: AtomicUsize = AtomicUsize::new(0);

        let mut set = TaskSet::new();
        set.add(1, |_client| async {
            TICKS.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(set.len(), 1);

        let client: Arc<dyn Client> = Arc::new(RecordingClient::new());
        let handles = set.spawn_all(client);

        tokio::time::sleep(Duration::from_millis(100)).await;
        // The first run happens immediately after spawn.
        assert!(TICKS.load(Ordering::SeqCst) >= 1);

        set.cancel();
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn cancelled_sets_spawn_finished_tasks() {
        let mut set = TaskSet::new();
        set.add(60, |_client| async {});
        set.cancel();

        let client: Arc<dyn Client> = Arc::new(RecordingClient::new());
        for handle in set.spawn_all(client) {
            handle.await.unwrap();
        }
    }
}
