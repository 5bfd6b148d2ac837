//! Periodic background jobs.
//!
//! - `PeriodicJob`: one unit of scheduled work (`name` + `run`)
//! - `JobRunner`: drives a job on a fixed interval on the tokio runtime
//! - `StatusSyncJob` / `ReminderJob`: the status engine and the reminder gate
//!
//! A run always completes before the next tick is taken, missed ticks are
//! skipped, and failures are logged without retry.

pub mod reminders;
pub mod runner;
pub mod status_sync;

pub use reminders::ReminderJob;
pub use runner::{JobHandle, JobRunner, PeriodicJob};
pub use status_sync::StatusSyncJob;
