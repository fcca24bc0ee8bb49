//! Per-user async lock registry.
//!
//! Serializes the check-then-insert sequence of daily generation for one
//! user within this process. Different users never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::UserId;

#[derive(Debug, Default, Clone)]
pub struct UserLocks {
    locks: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user_id`'s generation slot.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop entries nobody is holding or waiting on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(user_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of users with a held or awaited lock.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
