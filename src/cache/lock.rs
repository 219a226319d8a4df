use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

// Stores only ever grow, so a guard recovered from a poisoned lock still sees
// a consistent map (at worst missing the entry the panicking writer held).

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            lock_kind = "rwlock.read",
            result = "poisoned_recovered",
            "Recovered from poisoned store lock"
        );
        poisoned.into_inner()
    })
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            lock_kind = "rwlock.write",
            result = "poisoned_recovered",
            "Recovered from poisoned store lock"
        );
        poisoned.into_inner()
    })
}
