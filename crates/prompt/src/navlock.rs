use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

/// Refcounted registry of user-navigation locks.
///
/// While any lock is held, user-triggered navigation (back, quit,
/// keyboard-confirmed screen changes) is suppressed application-wide. Locks
/// are keyed by an owner identifier unique per form class, so unrelated forms
/// never interfere with each other; repeated acquisitions under the same key
/// are counted and the key is only free once every acquisition was released.
///
/// Cloning is cheap; clones share the same underlying registry.
#[derive(Clone, Default)]
pub struct NavLocks {
    inner: Arc<Mutex<HashMap<String, u32>>>,
}

impl NavLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, owner: &str) {
        let mut locks = self.inner.lock().expect("nav lock registry poisoned");
        *locks.entry(owner.to_string()).or_insert(0) += 1;
    }

    /// Release one acquisition for `owner`. Releasing a key that is not held
    /// is a logged no-op, never an error.
    pub fn release(&self, owner: &str) {
        let mut locks = self.inner.lock().expect("nav lock registry poisoned");
        match locks.get_mut(owner) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                locks.remove(owner);
            }
            None => warn!(owner, "released a navigation lock that was not held"),
        }
    }

    pub fn is_held(&self, owner: &str) -> bool {
        self.inner
            .lock()
            .expect("nav lock registry poisoned")
            .contains_key(owner)
    }

    /// True while any owner holds a lock.
    pub fn is_locked(&self) -> bool {
        !self
            .inner
            .lock()
            .expect("nav lock registry poisoned")
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_release_roundtrip() {
        let locks = NavLocks::new();
        assert!(!locks.is_locked());
        locks.acquire("login");
        assert!(locks.is_locked());
        assert!(locks.is_held("login"));
        locks.release("login");
        assert!(!locks.is_locked());
    }

    #[test]
    fn same_key_is_refcounted() {
        let locks = NavLocks::new();
        locks.acquire("registration");
        locks.acquire("registration");
        locks.release("registration");
        assert!(locks.is_held("registration"));
        locks.release("registration");
        assert!(!locks.is_locked());
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let locks = NavLocks::new();
        locks.acquire("login");
        locks.acquire("gift-code");
        locks.release("login");
        assert!(locks.is_held("gift-code"));
        assert!(!locks.is_held("login"));
    }

    #[test]
    fn releasing_unheld_key_is_a_noop() {
        let locks = NavLocks::new();
        locks.release("never-acquired");
        assert!(!locks.is_locked());
    }
}
