//! Concurrent counter exercise.
//!
//! N worker threads each increment a mutex-guarded shared counter exactly
//! once and signal a Go-style [`WaitGroup`]; the initiating [`Runner`]
//! blocks until every worker has signaled, then reads the final value.
//! When the run is clean, the count equals N — no lost or double-counted
//! increments.

pub mod counter;
pub mod error;
pub mod runner;
pub mod waitgroup;

pub use counter::SharedCounter;
pub use error::TallyError;
pub use runner::{RunReport, RunState, Runner};
pub use waitgroup::{DoneGuard, WaitGroup};
