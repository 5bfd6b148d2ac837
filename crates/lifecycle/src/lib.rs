//! `eventia-lifecycle`: time-driven status of events, venues and staff.
//!
//! Statuses are a pure function of the local wall clock and the stored
//! schedule. [`rules`] holds that function; [`engine::StatusEngine`] applies it
//! to a [`LifecycleStore`] on each tick.

pub mod engine;
pub mod manual;
pub mod rules;
pub mod schedule;
pub mod status;
pub mod window;

pub use engine::{LifecycleStore, LifecycleStoreError, StaffAssignment, StatusEngine, TransitionReport, VenueRef};
pub use manual::EventStatusWriter;
pub use schedule::EventSchedule;
pub use status::{EventStatus, StaffStatus, VenueStatus};
pub use window::TimeWindow;
