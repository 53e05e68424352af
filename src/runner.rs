//! The initiator: spawns N workers, waits on the barrier, reads the count.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Sender};

use crate::counter::SharedCounter;
use crate::error::TallyError;
use crate::waitgroup::WaitGroup;

/// Where the initiator is in its lifecycle. `Done` is reached only after
/// every worker has signaled the barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Spawning,
    Waiting,
    Done,
}

/// What a completed run observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub workers: usize,
    pub final_count: u64,
    pub elapsed: Duration,
}

/// Runs the counter exercise: each of `workers` threads increments a fresh
/// shared counter exactly once; `run` returns once all of them have
/// signaled, with the final value.
#[derive(Debug)]
pub struct Runner {
    workers: usize,
    wait_timeout: Option<Duration>,
    state: RunState,
}

impl Runner {
    pub fn new(workers: usize) -> Self {
        Runner {
            workers,
            wait_timeout: None,
            state: RunState::Idle,
        }
    }

    /// Bound the barrier wait. Without this the wait blocks until every
    /// worker signals, however long that takes.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run(&mut self) -> Result<RunReport, TallyError> {
        let started = Instant::now();
        // Fresh state per run: no ambient globals, every worker gets a
        // handle to this one counter and this one barrier.
        let counter = Arc::new(SharedCounter::new());
        let wg = Arc::new(WaitGroup::new());
        let (fault_tx, fault_rx) = channel::unbounded();

        self.state = RunState::Spawning;
        for id in 0..self.workers {
            wg.add(1);
            if let Err(source) = spawn_worker(id, &counter, &wg, &fault_tx) {
                // The thread never started, so nothing will signal for it;
                // release the registration or the wait could never finish.
                wg.done();
                return Err(TallyError::Spawn { id, source });
            }
        }
        drop(fault_tx);

        self.state = RunState::Waiting;
        match self.wait_timeout {
            Some(timeout) => wg.wait_timeout(timeout)?,
            None => wg.wait(),
        }

        // All workers signaled. Any that failed to increment reported here.
        if let Some(fault) = fault_rx.try_iter().next() {
            return Err(fault);
        }

        self.state = RunState::Done;
        Ok(RunReport {
            workers: self.workers,
            final_count: counter.value()?,
            elapsed: started.elapsed(),
        })
    }
}

fn spawn_worker(
    id: usize,
    counter: &Arc<SharedCounter>,
    wg: &Arc<WaitGroup>,
    faults: &Sender<TallyError>,
) -> std::io::Result<()> {
    let counter = Arc::clone(counter);
    let wg = Arc::clone(wg);
    let faults = faults.clone();
    thread::Builder::new()
        .name(format!("tally-worker-{id}"))
        .spawn(move || {
            // Signals the barrier when dropped, on every exit path.
            let _done = wg.done_guard();
            if let Err(err) = counter.increment() {
                let _ = faults.send(err);
            }
        })
        .map(|_handle| ())
}
