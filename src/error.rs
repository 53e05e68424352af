use std::io;
use std::time::Duration;

/// Everything that can go wrong in a counter run.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    #[error("counter lock poisoned: a worker panicked while holding it")]
    LockPoisoned,

    #[error("wait timed out after {waited:?} with {pending} worker(s) still outstanding")]
    WaitTimeout { pending: usize, waited: Duration },

    #[error("failed to spawn worker {id}: {source}")]
    Spawn {
        id: usize,
        #[source]
        source: io::Error,
    },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}
