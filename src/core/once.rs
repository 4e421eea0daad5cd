//! One-time initialization guard with an observable state.
//!
//! [`InitGuard`] runs an initializer at most once. Readers that arrive after
//! completion take a lock-free path; readers that arrive while another
//! caller is computing block until the value is published.
//!
//! ```text
//! Uninit ──first caller──▶ InProgress ──initializer returns──▶ Done
//!    ▲                          │
//!    └──── initializer panics ──┘
//! ```

use std::fmt;
use std::sync::OnceLock;

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Observable state of an [`InitGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninit,
    InProgress,
    Done,
}

/// A memoizing cell that computes its value exactly once.
///
/// The value is published through a [`OnceLock`], so every field written by
/// the initializer happens-before any read that observes `Done`.
pub struct InitGuard<T> {
    value: OnceLock<T>,
    state: Mutex<InitState>,
    ready: Condvar,
}

impl<T> InitGuard<T> {
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
            state: Mutex::new(InitState::Uninit),
            ready: Condvar::new(),
        }
    }

    /// Current state (a snapshot; it may advance right after returning).
    pub fn state(&self) -> InitState {
        if self.value.get().is_some() {
            return InitState::Done;
        }
        *self.state.lock()
    }

    /// The value, if initialization has completed.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Return the value, running `init` if no caller has done so yet.
    ///
    /// Concurrent callers block until the first one finishes and then all
    /// observe the same value. `init` runs without the state lock held.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }

        let mut state = self.state.lock();
        loop {
            match *state {
                InitState::Done => match self.value.get() {
                    Some(value) => return value,
                    None => *state = InitState::Uninit,
                },
                InitState::InProgress => self.ready.wait(&mut state),
                InitState::Uninit => break,
            }
        }

        *state = InitState::InProgress;
        let computed = MutexGuard::unlocked(&mut state, || {
            let reset = ResetOnPanic(self);
            let computed = init();
            std::mem::forget(reset);
            computed
        });
        let value = self.value.get_or_init(move || computed);
        *state = InitState::Done;
        self.ready.notify_all();
        value
    }
}

impl<T> Default for InitGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for InitGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitGuard")
            .field("state", &self.state())
            .field("value", &self.value.get())
            .finish()
    }
}

/// Rolls the guard back to `Uninit` when an initializer unwinds, so waiters
/// are released and a later caller can retry.
struct ResetOnPanic<'a, T>(&'a InitGuard<T>);

impl<T> Drop for ResetOnPanic<'_, T> {
    fn drop(&mut self) {
        *self.0.state.lock() = InitState::Uninit;
        self.0.ready.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_init_guard_runs_once() {
        let guard = InitGuard::new();
        assert_eq!(guard.state(), InitState::Uninit);
        assert_eq!(*guard.get_or_init(|| 42), 42);
        assert_eq!(*guard.get_or_init(|| 7), 42);
        assert_eq!(guard.state(), InitState::Done);
        assert_eq!(guard.get(), Some(&42));
    }

    #[test]
    fn test_init_guard_concurrent_callers_share_result() {
        let guard: InitGuard<String> = InitGuard::new();
        let calls = AtomicUsize::new(0);

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        guard
                            .get_or_init(|| {
                                calls.fetch_add(1, Ordering::SeqCst);
                                std::thread::sleep(Duration::from_millis(20));
                                "computed".to_string()
                            })
                            .clone()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), "computed");
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_init_guard_recovers_after_panic() {
        let guard: InitGuard<u32> = InitGuard::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            guard.get_or_init(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(guard.state(), InitState::Uninit);
        assert_eq!(*guard.get_or_init(|| 5), 5);
    }
}
