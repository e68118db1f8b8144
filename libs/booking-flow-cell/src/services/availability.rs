use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_api::BookingApiClient;

use crate::models::{DayAvailabilityEntry, SchedulingError};

pub struct AvailabilityService {
    api: Arc<BookingApiClient>,
}

impl AvailabilityService {
    pub fn new(api: Arc<BookingApiClient>) -> Self {
        Self { api }
    }

    /// Fetch the occupied hours for one provider on one day.
    ///
    /// Past dates are legal to query; excluding past hours is the slot
    /// deriver's job. Any failure maps to `RemoteUnavailable`, which the
    /// caller must treat as "no data yet" rather than a fully open day.
    pub async fn fetch_day_availability(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<HashSet<u32>, SchedulingError> {
        debug!(
            "Fetching day availability for provider {} on {}",
            provider_id, date
        );

        let path = format!(
            "/providers/{}/day-availability?year={}&month={}&day={}",
            provider_id,
            date.year(),
            date.month(),
            date.day()
        );

        let entries: Vec<DayAvailabilityEntry> = self
            .api
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| {
                warn!(
                    "Day availability fetch failed for provider {} on {}: {}",
                    provider_id, date, e
                );
                SchedulingError::RemoteUnavailable(e.to_string())
            })?;

        let occupied: HashSet<u32> = entries
            .into_iter()
            .filter(|entry| !entry.available)
            .map(|entry| entry.hour)
            .collect();

        debug!(
            "Provider {} has {} occupied hours on {}",
            provider_id,
            occupied.len(),
            date
        );

        Ok(occupied)
    }
}
