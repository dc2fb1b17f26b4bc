//! Timed exclusion lock for device open/close.
//!
//! Concurrent open and close must not interleave handle construction and
//! teardown. Acquisition waits a bounded time; contention is a
//! recoverable [`CameraError::DeviceBusy`], never a fatal condition.

use crate::error::CameraError;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Exclusive lock with bounded acquisition.
#[derive(Debug, Default)]
pub struct DeviceLock {
    held: Mutex<bool>,
    released: Condvar,
}

/// Guard releasing the lock on drop.
#[derive(Debug)]
pub struct DeviceLockGuard<'a> {
    lock: &'a DeviceLock,
}

impl DeviceLock {
    /// An unheld lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock, waiting up to `timeout`.
    pub fn acquire(&self, timeout: Duration) -> Result<DeviceLockGuard<'_>, CameraError> {
        let deadline = Instant::now() + timeout;
        let mut held = self.held.lock().expect("device lock poisoned");

        while *held {
            let now = Instant::now();
            if now >= deadline {
                return Err(CameraError::DeviceBusy);
            }
            let (guard, result) = self
                .released
                .wait_timeout(held, deadline - now)
                .expect("device lock poisoned");
            held = guard;
            if result.timed_out() && *held {
                return Err(CameraError::DeviceBusy);
            }
        }

        *held = true;
        Ok(DeviceLockGuard { lock: self })
    }
}

impl Drop for DeviceLockGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.lock.held.lock().expect("device lock poisoned");
        *held = false;
        self.lock.released.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_acquire_and_release() {
        let lock = DeviceLock::new();
        {
            let _guard = lock.acquire(Duration::from_millis(10)).unwrap();
        }
        // Released on drop; a second acquisition must succeed.
        let _guard = lock.acquire(Duration::from_millis(10)).unwrap();
    }

    #[test]
    fn test_contention_times_out() {
        let lock = Arc::new(DeviceLock::new());
        let _guard = lock.acquire(Duration::from_millis(10)).unwrap();

        let contender = Arc::clone(&lock);
        let result = std::thread::spawn(move || {
            contender
                .acquire(Duration::from_millis(20))
                .map(|_| ())
                .err()
        })
        .join()
        .unwrap();

        assert!(matches!(result, Some(CameraError::DeviceBusy)));
    }

    #[test]
    fn test_waiter_wakes_on_release() {
        let lock = Arc::new(DeviceLock::new());
        let guard = lock.acquire(Duration::from_millis(10)).unwrap();

        let contender = Arc::clone(&lock);
        let waiter = std::thread::spawn(move || {
            contender.acquire(Duration::from_secs(2)).map(|_| ()).is_ok()
        });

        std::thread::sleep(Duration::from_millis(20));
        drop(guard);
        assert!(waiter.join().unwrap());
    }
}
