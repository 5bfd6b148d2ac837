//! Lifecycle status enums and their persisted (wire) names.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eventia_core::DomainError;

/// Event lifecycle status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(rename = "en_attente")]
    Pending,
    #[serde(rename = "confirme")]
    Confirmed,
    #[serde(rename = "en_cours")]
    Ongoing,
    #[serde(rename = "termine")]
    Completed,
    /// Set by admins only; the engine never touches cancelled events.
    #[serde(rename = "annuler")]
    Cancelled,
    #[serde(rename = "echoue")]
    Failed,
}

impl EventStatus {
    pub const ALL: [EventStatus; 6] = [
        EventStatus::Pending,
        EventStatus::Confirmed,
        EventStatus::Ongoing,
        EventStatus::Completed,
        EventStatus::Cancelled,
        EventStatus::Failed,
    ];

    /// Statuses the engine may still move.
    pub const OPEN: [EventStatus; 3] = [
        EventStatus::Pending,
        EventStatus::Confirmed,
        EventStatus::Ongoing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "en_attente",
            EventStatus::Confirmed => "confirme",
            EventStatus::Ongoing => "en_cours",
            EventStatus::Completed => "termine",
            EventStatus::Cancelled => "annuler",
            EventStatus::Failed => "echoue",
        }
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| DomainError::unknown_variant("event status", s))
    }
}

/// Venue occupancy status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueStatus {
    #[serde(rename = "vide")]
    Empty,
    #[serde(rename = "en_attente")]
    Awaiting,
    #[serde(rename = "occupe")]
    Occupied,
}

impl VenueStatus {
    pub const ALL: [VenueStatus; 3] = [VenueStatus::Empty, VenueStatus::Awaiting, VenueStatus::Occupied];

    pub fn as_str(&self) -> &'static str {
        match self {
            VenueStatus::Empty => "vide",
            VenueStatus::Awaiting => "en_attente",
            VenueStatus::Occupied => "occupe",
        }
    }
}

impl core::fmt::Display for VenueStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VenueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VenueStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| DomainError::unknown_variant("venue status", s))
    }
}

/// Staff availability status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
    Active,
    Inactive,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
        }
    }
}

impl core::fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(StaffStatus::Active),
            "inactive" => Ok(StaffStatus::Inactive),
            other => Err(DomainError::unknown_variant("staff status", other)),
        }
    }
}
