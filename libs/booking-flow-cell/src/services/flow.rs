use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use shared_api::BookingApiClient;

use crate::models::{ConfirmedAppointment, FetchTicket, Provider, SchedulingError};
use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;
use crate::services::selection::SelectionFlow;

/// One booking attempt end to end: selection changes trigger an
/// availability fetch, the derived slot list feeds hour picks, and a
/// finalized selection is submitted exactly once at a time.
pub struct BookingFlow {
    availability: AvailabilityService,
    booking: BookingService,
    state: SelectionFlow,
}

impl BookingFlow {
    pub fn new(api: Arc<BookingApiClient>, initial_date: NaiveDate) -> Self {
        Self {
            availability: AvailabilityService::new(Arc::clone(&api)),
            booking: BookingService::new(api),
            state: SelectionFlow::new(initial_date),
        }
    }

    /// Read access for rendering the current flow state.
    pub fn state(&self) -> &SelectionFlow {
        &self.state
    }

    pub async fn change_provider(
        &mut self,
        provider: Provider,
        auth_token: &str,
    ) -> Result<(), SchedulingError> {
        let ticket = self.state.select_provider(provider)?;
        self.fetch_and_apply(ticket, auth_token).await
    }

    pub async fn change_date(
        &mut self,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<(), SchedulingError> {
        match self.state.select_date(date)? {
            Some(ticket) => self.fetch_and_apply(ticket, auth_token).await,
            None => Ok(()),
        }
    }

    /// Re-read availability for the current pair, superseding any fetch
    /// still in flight. Used after `RemoteUnavailable` and after a
    /// submission conflict.
    pub async fn refresh_availability(&mut self, auth_token: &str) -> Result<(), SchedulingError> {
        match self.state.refresh()? {
            Some(ticket) => self.fetch_and_apply(ticket, auth_token).await,
            None => Ok(()),
        }
    }

    pub fn choose_hour(&mut self, hour: u32) -> Result<bool, SchedulingError> {
        self.state.select_hour(hour)
    }

    pub fn is_submittable(&self) -> bool {
        self.state.is_submittable()
    }

    pub async fn submit(&mut self, auth_token: &str) -> Result<ConfirmedAppointment, SchedulingError> {
        let request = self.state.begin_submission()?;

        match self.booking.submit(&request, auth_token).await {
            Ok(confirmed) => {
                self.state.submission_succeeded();
                Ok(confirmed)
            }
            Err(error) => {
                self.state.submission_failed(error.clone());
                Err(error)
            }
        }
    }

    async fn fetch_and_apply(
        &mut self,
        ticket: FetchTicket,
        auth_token: &str,
    ) -> Result<(), SchedulingError> {
        let occupied = self
            .availability
            .fetch_day_availability(ticket.provider_id, ticket.date, auth_token)
            .await?;

        if !self.state.apply_availability(ticket, occupied) {
            debug!("Availability response superseded before it could be applied");
        }

        Ok(())
    }
}
