use std::env;
use tracing::warn;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub booking_api_url: String,
    pub booking_api_key: String,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            booking_api_url: env::var("BOOKING_API_URL")
                .unwrap_or_else(|_| {
                    warn!("BOOKING_API_URL not set, using empty value");
                    String::new()
                }),
            booking_api_key: env::var("BOOKING_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("BOOKING_API_KEY not set, using empty value");
                    String::new()
                }),
            request_timeout_secs: env::var("BOOKING_API_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_else(|| {
                    warn!(
                        "BOOKING_API_TIMEOUT_SECS not set or invalid, using default of {}s",
                        DEFAULT_REQUEST_TIMEOUT_SECS
                    );
                    DEFAULT_REQUEST_TIMEOUT_SECS
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.booking_api_url.is_empty() && !self.booking_api_key.is_empty()
    }
}
