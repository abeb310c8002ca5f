use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Registry of armed one-shot timers, keyed by entity id.
///
/// `insert`, `remove`, and `shutdown` are the only mutators; a replaced or
/// removed entry has its task aborted without running its effects. Firing
/// tasks call `forget` so completed entries do not accumulate.
#[derive(Default)]
pub struct JobTable {
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: &str, handle: JoinHandle<()>) {
        if let Some(old) = self.jobs.lock().await.insert(id.to_string(), handle) {
            old.abort();
        }
    }

    /// Disarms the timer for `id`. Idempotent: returns false if nothing
    /// was armed.
    pub async fn remove(&self, id: &str) -> bool {
        match self.jobs.lock().await.remove(id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Drops the entry without aborting; called by a timer that just fired.
    pub async fn forget(&self, id: &str) {
        self.jobs.lock().await.remove(id);
    }

    pub async fn shutdown(&self) {
        let mut jobs = self.jobs.lock().await;
        for (_, handle) in jobs.drain() {
            handle.abort();
        }
    }

    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }
}
