//! Shared lock handling for store backends.
//!
//! Backends guard their shared state with `std::sync` primitives. These
//! helpers centralize poison recovery so a panic in one critical section
//! cannot cascade into every later operation.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Acquires a mutex with poison recovery.
///
/// If the mutex is poisoned by a panic in a previous critical section, the
/// inner value is recovered and a warning is logged. Backend state is a plain
/// map or connection handle and stays usable across such a panic.
pub(crate) fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("store mutex was poisoned, recovering");
            metrics::counter!("store_lock_poison_recovery_total").increment(1);
            poisoned.into_inner()
        }
    }
}

/// Acquires a read guard with poison recovery.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("store rwlock was poisoned, recovering (read)");
            metrics::counter!("store_lock_poison_recovery_total").increment(1);
            poisoned.into_inner()
        }
    }
}

/// Acquires a write guard with poison recovery.
pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("store rwlock was poisoned, recovering (write)");
            metrics::counter!("store_lock_poison_recovery_total").increment(1);
            poisoned.into_inner()
        }
    }
}
