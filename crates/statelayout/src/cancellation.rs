#![forbid(unsafe_code)]

//! Cooperative cancellation for work scheduled on behalf of a screen.
//!
//! A screen hands a [`CancellationToken`] to everything it starts (worker
//! threads, delayed messages) and keeps the [`CancellationSource`]. When the
//! screen is torn down it cancels the source, and every holder of a token can
//! observe that and bail out instead of touching a dead view tree.
//!
//! ```
//! use statelayout::cancellation::CancellationSource;
//! use std::time::Duration;
//!
//! let source = CancellationSource::new();
//! let token = source.token();
//!
//! let worker = std::thread::spawn(move || {
//!     // Sleep up to a second unless the owner goes away first.
//!     token.wait_timeout(Duration::from_secs(1))
//! });
//!
//! source.cancel();
//! assert!(worker.join().unwrap());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use web_time::{Duration, Instant};

struct Shared {
    cancelled: AtomicBool,
    wake: (Mutex<()>, Condvar),
}

/// Observes a [`CancellationSource`]. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

/// Owner side of a cancellation signal.
///
/// Dropping the source does not cancel.
pub struct CancellationSource {
    shared: Arc<Shared>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cancelled: AtomicBool::new(false),
                wake: (Mutex::new(()), Condvar::new()),
            }),
        }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Signal cancellation and wake every blocked [`CancellationToken::wait_timeout`].
    pub fn cancel(&self) {
        if self.shared.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let (lock, cvar) = &self.shared.wake;
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Block until cancelled or until `timeout` elapses.
    ///
    /// Returns `true` if cancelled, `false` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let (lock, cvar) = &self.shared.wake;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = cvar
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fresh_source_is_live() {
        let source = CancellationSource::default();
        assert!(!source.is_cancelled());
        assert!(!source.token().is_cancelled());
    }

    #[test]
    fn cancel_reaches_every_clone() {
        let source = CancellationSource::new();
        let a = source.token();
        let b = a.clone();
        source.cancel();
        source.cancel();
        assert!(a.is_cancelled() && b.is_cancelled());
    }

    #[test]
    fn dropping_source_does_not_cancel() {
        let source = CancellationSource::new();
        let token = source.token();
        drop(source);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn wait_times_out_when_live() {
        let token = CancellationSource::new().token();
        assert!(!token.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn wait_returns_immediately_when_cancelled() {
        let source = CancellationSource::new();
        source.cancel();
        let start = Instant::now();
        assert!(source.token().wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn cancel_wakes_waiting_thread() {
        let source = CancellationSource::new();
        let token = source.token();
        let waiter = thread::spawn(move || token.wait_timeout(Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(20));
        source.cancel();
        assert!(waiter.join().unwrap());
    }
}
