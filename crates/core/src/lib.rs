//! `eventia-core`: shared primitives for the event-management backend.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, LocalCalendar, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{EventId, StaffId, TenantId, UserId, VenueId};
