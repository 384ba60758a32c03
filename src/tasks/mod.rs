//! Background Tasks Module
//!
//! Optional periodic maintenance for a cache registry.
//!
//! # Tasks
//! - Expiry sweep: drops expired records that nobody has read since they went stale

mod sweep;

pub use sweep::spawn_sweep_task;
