use crate::foundation::{CustodyError, STORAGE_LOCK_TIMEOUT_SECS};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(5);

pub fn acquire_with_timeout<'a, T>(lock: &'a Mutex<T>, operation: &'static str) -> Result<MutexGuard<'a, T>, CustodyError> {
    acquire_with_timeout_for(lock, operation, Duration::from_secs(STORAGE_LOCK_TIMEOUT_SECS))
}

/// Polls `try_lock` until `timeout`; a poisoned lock is reported immediately.
pub fn acquire_with_timeout_for<'a, T>(
    lock: &'a Mutex<T>,
    operation: &'static str,
    timeout: Duration,
) -> Result<MutexGuard<'a, T>, CustodyError> {
    let deadline = Instant::now() + timeout;
    loop {
        match lock.try_lock() {
            Ok(guard) => return Ok(guard),
            Err(TryLockError::Poisoned(_)) => {
                return Err(CustodyError::StorageError { operation: operation.to_string(), details: "mutex poisoned".to_string() });
            }
            Err(TryLockError::WouldBlock) if Instant::now() >= deadline => {
                return Err(CustodyError::StorageLockTimeout { operation: operation.to_string(), timeout_secs: timeout.as_secs() });
            }
            Err(TryLockError::WouldBlock) => std::thread::sleep(LOCK_POLL_INTERVAL),
        }
    }
}
