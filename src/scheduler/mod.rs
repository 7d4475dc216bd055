// src/scheduler/mod.rs
// =============================================================================
// Bounds how many probes run at once and how fast new ones start.
//
// Why both?
// - The concurrency cap limits open connections at any instant
// - The interval cap limits bursts against remote servers over time
// =============================================================================

mod queue;

pub use queue::{Scheduler, TaskQueue};
