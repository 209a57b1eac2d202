//! # Execution Engine
//!
//! Drives a request through node selection, transport, classification and
//! backoff until it reaches a terminal outcome. Transactions and queries
//! share this engine through the [`Executable`] trait.

pub mod backoff;
pub mod cancel;
pub mod classify;
mod executor;

pub use backoff::Backoff;
pub use cancel::{cancellation, CancellationHandle, CancellationSignal};
pub use classify::Verdict;
pub use executor::{execute, Executable, ExecuteOptions};
