// libs/booking-flow-cell/src/models.rs
use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// CORE BOOKING-FLOW MODELS
// ==============================================================================

/// A service provider as listed by the remote directory. Referenced by the
/// selection, never owned beyond the lifetime of one booking attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// The daily bookable grid: two blocks of hourly slots separated by the
/// lunch break. Hours are hour-of-day values and must stay within 0-23.
#[derive(Debug, Clone)]
pub struct SlotGridConfig {
    pub morning_hours: RangeInclusive<u32>,
    pub afternoon_hours: RangeInclusive<u32>,
}

impl Default for SlotGridConfig {
    fn default() -> Self {
        Self {
            morning_hours: 8..=11,
            afternoon_hours: 13..=17,
        }
    }
}

impl SlotGridConfig {
    /// All grid hours, morning block first, ascending within each block.
    pub fn hours(&self) -> impl Iterator<Item = u32> + '_ {
        self.morning_hours
            .clone()
            .chain(self.afternoon_hours.clone())
    }

    pub fn slot_count(&self) -> usize {
        self.hours().count()
    }

    pub fn is_morning(&self, hour: u32) -> bool {
        self.morning_hours.contains(&hour)
    }
}

/// One derived bookable unit within a day. Produced fresh on every
/// derivation; a new list replaces the old one whenever inputs change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub hour: u32,
    pub label: String,
    pub available: bool,
}

/// Per-hour row of the remote day-availability payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailabilityEntry {
    pub hour: u32,
    pub available: bool,
}

/// The user's in-progress choice for one booking attempt. Created with an
/// initial date, mutated only through `SelectionFlow`, and discarded when
/// the flow exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub provider: Option<Provider>,
    pub date: NaiveDate,
    pub hour: Option<u32>,
}

impl Selection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            provider: None,
            date,
            hour: None,
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Finalized payload for the remote booking call. Built only from a
/// submittable selection and dropped after one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedAppointment {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub hour: u32,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// SINGLE-FLIGHT FETCH TOKEN
// ==============================================================================

/// Token pairing an availability fetch with the selection state that
/// requested it. A response is applied only while its ticket matches the
/// flow's current generation and (provider, date) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub provider_id: Uuid,
    pub date: NaiveDate,
}

// ==============================================================================
// FLOW STATE
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    Empty,
    ProviderChosen,
    DateChosen,
    SlotChosen,
    Submitting,
    Submitted,
    Failed(SchedulingError),
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum SchedulingError {
    #[error("Availability service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Selected hour is no longer available")]
    StaleSelection,

    #[error("Submission already in progress")]
    SubmissionInProgress,

    #[error("Slot was booked by another client")]
    Conflict,

    #[error("Booking service unreachable: {0}")]
    Unreachable(String),
}
