//! Bounded-concurrency job execution.
//!
//! [`WorkerPool`] runs opaque jobs on a fixed set of background OS
//! threads; [`FetchCounters`] is the per-round completion tally the
//! controller polls. Tile fetching is the only workload, but the pool
//! itself is generic over `FnOnce` jobs.

mod counters;
mod pool;

pub use counters::{CountersSnapshot, FetchCounters};
pub use pool::{default_worker_count, WorkerPool};
