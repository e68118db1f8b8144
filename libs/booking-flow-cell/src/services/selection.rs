use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{
    BookingRequest, FetchTicket, FlowStage, Provider, SchedulingError, Selection, Slot,
    SlotGridConfig,
};
use crate::services::slots::derive_day_slots;

/// Single source of truth for one in-progress booking attempt.
///
/// Owns the selection, the latest derived slot list, and the fetch
/// generation counter. Exactly one caller mutates it (`&mut self`
/// methods); availability responses race against user input only through
/// `apply_availability`, which discards anything superseded.
pub struct SelectionFlow {
    grid: SlotGridConfig,
    selection: Selection,
    stage: FlowStage,
    slots: Vec<Slot>,
    occupied: Option<HashSet<u32>>,
    fetch_generation: u64,
}

impl SelectionFlow {
    pub fn new(initial_date: NaiveDate) -> Self {
        Self::with_grid(SlotGridConfig::default(), initial_date)
    }

    pub fn with_grid(grid: SlotGridConfig, initial_date: NaiveDate) -> Self {
        Self {
            grid,
            selection: Selection::new(initial_date),
            stage: FlowStage::Empty,
            slots: Vec::new(),
            occupied: None,
            fetch_generation: 0,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn stage(&self) -> &FlowStage {
        &self.stage
    }

    /// Current ordered slot list. Empty while availability is unknown.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn morning_slots(&self) -> Vec<Slot> {
        self.slots
            .iter()
            .filter(|slot| self.grid.is_morning(slot.hour))
            .cloned()
            .collect()
    }

    pub fn afternoon_slots(&self) -> Vec<Slot> {
        self.slots
            .iter()
            .filter(|slot| !self.grid.is_morning(slot.hour))
            .cloned()
            .collect()
    }

    /// Replace the provider. Clears the hour pick and invalidates the slot
    /// list: the new provider's availability is unknown until the returned
    /// ticket's fetch lands.
    pub fn select_provider(&mut self, provider: Provider) -> Result<FetchTicket, SchedulingError> {
        self.reject_if_submitting()?;

        let provider_id = provider.id;
        self.selection.provider = Some(provider);
        self.invalidate_availability();
        self.stage = FlowStage::ProviderChosen;

        Ok(self.issue_ticket(provider_id))
    }

    /// Replace the date. Clears the hour pick and invalidates the slot
    /// list. Returns a fetch ticket when a provider is already chosen.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<Option<FetchTicket>, SchedulingError> {
        self.reject_if_submitting()?;

        self.selection.date = date;
        self.invalidate_availability();

        match self.selection.provider.as_ref().map(|p| p.id) {
            Some(provider_id) => {
                self.stage = FlowStage::DateChosen;
                Ok(Some(self.issue_ticket(provider_id)))
            }
            None => {
                self.stage = FlowStage::Empty;
                Ok(None)
            }
        }
    }

    /// Reissue a ticket for the current (provider, date) pair, superseding
    /// any in-flight fetch. Used to retry after `RemoteUnavailable` and to
    /// re-read availability after a submission conflict.
    pub fn refresh(&mut self) -> Result<Option<FetchTicket>, SchedulingError> {
        self.reject_if_submitting()?;

        match self.selection.provider.as_ref().map(|p| p.id) {
            Some(provider_id) => Ok(Some(self.issue_ticket(provider_id))),
            None => Ok(None),
        }
    }

    /// Accept an availability response. Returns false when the response was
    /// superseded (older generation, mismatched pair) or arrived while the
    /// submission was being resolved, in which case no state changes.
    pub fn apply_availability(&mut self, ticket: FetchTicket, occupied: HashSet<u32>) -> bool {
        if matches!(self.stage, FlowStage::Submitting | FlowStage::Submitted) {
            warn!("Availability response discarded: submission already in flight or resolved");
            return false;
        }

        let current_pair = self
            .selection
            .provider
            .as_ref()
            .map(|p| (p.id, self.selection.date));

        if ticket.generation != self.fetch_generation
            || current_pair != Some((ticket.provider_id, ticket.date))
        {
            warn!(
                "Discarding stale availability response for provider {} on {}",
                ticket.provider_id, ticket.date
            );
            return false;
        }

        self.slots = derive_day_slots(&self.grid, self.selection.date, &occupied, Utc::now());
        self.occupied = Some(occupied);

        // A previously picked hour may have been taken in the meantime.
        if let Some(hour) = self.selection.hour {
            if !self.hour_is_available(hour) {
                debug!("Clearing hour {} no longer available after refresh", hour);
                self.selection.hour = None;
            }
        }

        self.settle_stage();
        true
    }

    /// Pick an hour. Accepted only when the hour is present and available
    /// in the current slot list; a stale tap after a re-derivation is
    /// ignored without changing state.
    pub fn select_hour(&mut self, hour: u32) -> Result<bool, SchedulingError> {
        self.reject_if_submitting()?;

        if !self.hour_is_available(hour) {
            debug!("Ignoring tap on unavailable hour {}", hour);
            return Ok(false);
        }

        self.selection.hour = Some(hour);
        self.stage = FlowStage::SlotChosen;
        Ok(true)
    }

    /// A submission is possible only with a provider, a picked hour, and
    /// that hour still present and available in the current slot list.
    pub fn is_submittable(&self) -> bool {
        if self.stage == FlowStage::Submitting {
            return false;
        }

        match (&self.selection.provider, self.selection.hour) {
            (Some(_), Some(hour)) => self.hour_is_available(hour),
            _ => false,
        }
    }

    /// Finalize the selection into a request and enter `Submitting`.
    /// Rejected locally, with no remote call, when the selection is
    /// incomplete or the picked hour went stale.
    pub fn begin_submission(&mut self) -> Result<BookingRequest, SchedulingError> {
        if self.stage == FlowStage::Submitting {
            return Err(SchedulingError::SubmissionInProgress);
        }

        if !self.is_submittable() {
            warn!("Submission rejected locally: selection incomplete or stale");
            return Err(SchedulingError::StaleSelection);
        }

        let provider_id = self
            .selection
            .provider
            .as_ref()
            .map(|p| p.id)
            .ok_or(SchedulingError::StaleSelection)?;
        let hour = self.selection.hour.ok_or(SchedulingError::StaleSelection)?;

        self.stage = FlowStage::Submitting;

        Ok(BookingRequest {
            provider_id,
            date: self.selection.date,
            hour,
        })
    }

    pub fn submission_succeeded(&mut self) {
        self.stage = FlowStage::Submitted;
    }

    /// Resolve a failed submission. A conflict invalidates both the picked
    /// hour and the availability snapshot it came from; the caller is
    /// expected to `refresh` and let the user re-select. Any other failure
    /// keeps the selection intact so the same request can be retried.
    pub fn submission_failed(&mut self, error: SchedulingError) {
        if error == SchedulingError::Conflict {
            self.selection.hour = None;
            self.occupied = None;
            self.slots.clear();
        }

        self.stage = FlowStage::Failed(error);
    }

    // Private helpers

    fn reject_if_submitting(&self) -> Result<(), SchedulingError> {
        if self.stage == FlowStage::Submitting {
            warn!("Mutation rejected while submission is in progress");
            return Err(SchedulingError::SubmissionInProgress);
        }
        Ok(())
    }

    fn invalidate_availability(&mut self) {
        self.selection.hour = None;
        self.occupied = None;
        self.slots.clear();
    }

    fn issue_ticket(&mut self, provider_id: Uuid) -> FetchTicket {
        self.fetch_generation += 1;
        FetchTicket {
            generation: self.fetch_generation,
            provider_id,
            date: self.selection.date,
        }
    }

    fn hour_is_available(&self, hour: u32) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.hour == hour && slot.available)
    }

    fn settle_stage(&mut self) {
        self.stage = if self.selection.hour.is_some() {
            FlowStage::SlotChosen
        } else if matches!(
            self.stage,
            FlowStage::DateChosen | FlowStage::SlotChosen | FlowStage::Failed(_)
        ) {
            FlowStage::DateChosen
        } else {
            self.stage.clone()
        };
    }
}
