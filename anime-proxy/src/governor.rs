use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Minimum spacing between upstream requests.
///
/// Only the request worker touches this, so the lock is never contended. The
/// timestamp moves forward after successful calls only.
pub struct RateGovernor {
    spacing: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateGovernor {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_request: Mutex::new(None),
        }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Sleep for whatever is left of the spacing window
    pub async fn wait_if_needed(&self) {
        let last = *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < self.spacing {
                let remaining = self.spacing - elapsed;
                log::debug!("Rate governor delaying next request by {:?}", remaining);
                tokio::time::sleep(remaining).await;
            }
        }
    }

    /// Stamp the completion of a successful upstream call
    pub fn record_success(&self) {
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());
    }
}
