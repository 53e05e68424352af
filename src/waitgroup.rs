//! Go-style completion barrier.
//!
//! The initiator registers one expected completion per worker with
//! [`WaitGroup::add`], each worker signals exactly once (normally through a
//! [`DoneGuard`], which signals on every exit path including a panic), and
//! the initiator blocks in [`WaitGroup::wait`] until the pending count
//! reaches zero.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::TallyError;

/// Counts registered-but-unsignaled parties and wakes waiters when the
/// count reaches zero.
#[derive(Debug, Default)]
pub struct WaitGroup {
    pending: Mutex<usize>,
    all_done: Condvar,
}

impl WaitGroup {
    pub fn new() -> Self {
        WaitGroup {
            pending: Mutex::new(0),
            all_done: Condvar::new(),
        }
    }

    // The pending count is a bare usize, so a panic elsewhere cannot leave
    // it invalid; recover from poisoning instead of propagating it.
    fn lock_pending(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `n` expected completions. Call before spawning each worker,
    /// never after the wait has started.
    pub fn add(&self, n: usize) {
        *self.lock_pending() += n;
    }

    /// Signal one completion.
    ///
    /// Panics if called more times than registered; that is a programming
    /// defect, not a runtime condition.
    pub fn done(&self) {
        let mut pending = self.lock_pending();
        *pending = pending
            .checked_sub(1)
            .expect("WaitGroup::done signaled more times than add registered");
        if *pending == 0 {
            self.all_done.notify_all();
        }
    }

    /// A guard that calls [`done`](Self::done) when dropped. Workers hold
    /// one for their whole body so the barrier is released even if they
    /// panic partway through.
    pub fn done_guard(self: &Arc<Self>) -> DoneGuard {
        DoneGuard {
            wg: Arc::clone(self),
        }
    }

    /// Block until every registered party has signaled. Returns immediately
    /// when nothing is pending.
    pub fn wait(&self) {
        let pending = self.lock_pending();
        let _pending = self
            .all_done
            .wait_while(pending, |p| *p > 0)
            .unwrap_or_else(|e| e.into_inner());
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout` and reports
    /// how many parties were still outstanding.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), TallyError> {
        let started = Instant::now();
        let pending = self.lock_pending();
        let (pending, result) = self
            .all_done
            .wait_timeout_while(pending, timeout, |p| *p > 0)
            .unwrap_or_else(|e| e.into_inner());
        if result.timed_out() && *pending > 0 {
            return Err(TallyError::WaitTimeout {
                pending: *pending,
                waited: started.elapsed(),
            });
        }
        Ok(())
    }

    /// Registered-minus-signaled count right now.
    pub fn pending(&self) -> usize {
        *self.lock_pending()
    }
}

/// Signals its `WaitGroup` exactly once, when dropped.
#[derive(Debug)]
pub struct DoneGuard {
    wg: Arc<WaitGroup>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.wg.done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_with_nothing_pending_returns_immediately() {
        let wg = WaitGroup::new();
        wg.wait();
        assert_eq!(wg.pending(), 0);
    }

    #[test]
    fn add_and_done_reach_zero() {
        let wg = WaitGroup::new();
        wg.add(2);
        assert_eq!(wg.pending(), 2);
        wg.done();
        wg.done();
        assert_eq!(wg.pending(), 0);
        wg.wait();
    }

    #[test]
    fn wait_unblocks_when_workers_signal() {
        let wg = Arc::new(WaitGroup::new());
        for _ in 0..8 {
            wg.add(1);
            let wg = Arc::clone(&wg);
            thread::spawn(move || {
                let _done = wg.done_guard();
            });
        }
        wg.wait();
        assert_eq!(wg.pending(), 0);
    }

    #[test]
    fn wait_timeout_reports_outstanding_parties() {
        let wg = WaitGroup::new();
        wg.add(1);
        let err = wg
            .wait_timeout(Duration::from_millis(20))
            .expect_err("nothing ever signals, so the wait must time out");
        match err {
            TallyError::WaitTimeout { pending, waited } => {
                assert_eq!(pending, 1);
                assert!(waited >= Duration::from_millis(20));
            }
            other => panic!("expected WaitTimeout, got {other:?}"),
        }
    }

    #[test]
    fn wait_timeout_succeeds_when_already_done() {
        let wg = WaitGroup::new();
        wg.add(1);
        wg.done();
        wg.wait_timeout(Duration::from_millis(1)).unwrap();
    }

    #[test]
    #[should_panic(expected = "more times than add registered")]
    fn over_signaling_is_a_defect() {
        let wg = WaitGroup::new();
        wg.add(1);
        wg.done();
        wg.done();
    }

    #[test]
    fn guard_signals_even_when_the_worker_panics() {
        let wg = Arc::new(WaitGroup::new());
        wg.add(1);
        let worker_wg = Arc::clone(&wg);
        let handle = thread::spawn(move || {
            let _done = worker_wg.done_guard();
            panic!("worker blew up");
        });
        assert!(handle.join().is_err());
        // Must not deadlock: the guard signaled during unwinding.
        wg.wait();
        assert_eq!(wg.pending(), 0);
    }
}
