use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One mutex per user. Writers for the same user run one at a time while
/// different users never wait on each other.
#[derive(Debug, Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(user_id).or_default().clone()
    }

    pub fn with_user<T>(&self, user_id: i64, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
