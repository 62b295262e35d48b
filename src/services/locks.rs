use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-user mutation locks.
///
/// Every read-modify-write on a profile or its taste records must hold the
/// owning user's guard for the whole critical section, so two concurrent
/// taste events on the same user can never lose an update on the additive
/// weight. Different users never contend.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive guard for one user
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().await;
            Arc::clone(registry.entry(user_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
