use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use shared_api::{ApiError, BookingApiClient};

use crate::models::{BookingRequest, ConfirmedAppointment, SchedulingError};

pub struct BookingService {
    api: Arc<BookingApiClient>,
}

impl BookingService {
    pub fn new(api: Arc<BookingApiClient>) -> Self {
        Self { api }
    }

    /// Submit a finalized booking request.
    ///
    /// Availability is not re-checked here; the remote service is the
    /// authority and reports a slot taken concurrently by another client as
    /// a conflict. No submission state is retained between calls, so an
    /// unreachable-service failure is safe to retry with the same request.
    pub async fn submit(
        &self,
        request: &BookingRequest,
        auth_token: &str,
    ) -> Result<ConfirmedAppointment, SchedulingError> {
        info!(
            "Submitting booking for provider {} on {} at {:02}:00",
            request.provider_id, request.date, request.hour
        );

        let body = json!({
            "provider_id": request.provider_id,
            "date": request.date,
            "hour": request.hour,
        });

        let appointment: ConfirmedAppointment = self
            .api
            .request(Method::POST, "/appointments", Some(auth_token), Some(body))
            .await
            .map_err(classify_submission_error)?;

        info!(
            "Booking confirmed with id {} at {}",
            appointment.id, appointment.created_at
        );

        Ok(appointment)
    }
}

fn classify_submission_error(error: ApiError) -> SchedulingError {
    match error.status() {
        Some(StatusCode::CONFLICT) => {
            warn!("Booking rejected: slot was taken by another client");
            SchedulingError::Conflict
        }
        _ => SchedulingError::Unreachable(error.to_string()),
    }
}
