//! Background calendar refresh task.
//!
//! Publishes a new [`TickerSnapshot`] through a watch channel on every
//! successful fetch; the render loop picks up the latest without blocking.
//! Failed fetches keep the previous snapshot on screen and retry with a
//! capped exponential backoff.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use calclock_core::ticker::{self, EventPolicy, TickerSnapshot};
use calclock_core::ClockError;

use crate::config::GcalConfig;
use crate::credentials::CredentialProvider;
use crate::providers::gcal;

/// Delay before the first retry after a failed fetch.
const BACKOFF_START: Duration = Duration::from_secs(30);

pub struct Refresher<P> {
    provider: P,
    gcal: GcalConfig,
    policy: EventPolicy,
    interval: Duration,
    tx: watch::Sender<TickerSnapshot>,
}

impl<P: CredentialProvider + Send + Sync> Refresher<P> {
    pub fn new(
        provider: P,
        gcal: GcalConfig,
        policy: EventPolicy,
        interval: Duration,
        tx: watch::Sender<TickerSnapshot>,
    ) -> Self {
        Self {
            provider,
            gcal,
            policy,
            interval,
            tx,
        }
    }

    async fn refresh_once(&self, generation: u64) -> Result<TickerSnapshot, ClockError> {
        let tokens = self.provider.obtain().await?;
        let events = gcal::fetch_today(&self.gcal, &tokens).await?;
        let line = ticker::ticker_line(&events, self.policy, chrono::Utc::now());

        info!(generation, events = events.len(), line = %line, "fetched today's events");

        Ok(TickerSnapshot { generation, line })
    }

    /// Run until the render loop drops its receiver.
    pub async fn run(self) {
        let mut generation: u64 = 0;
        let mut backoff = BACKOFF_START;

        loop {
            generation += 1;

            let delay = match self.refresh_once(generation).await {
                Ok(snapshot) => {
                    if self.tx.send(snapshot).is_err() {
                        return;
                    }
                    backoff = BACKOFF_START;
                    self.interval
                }
                Err(err) => {
                    warn!(%err, retry_secs = backoff.as_secs(), "refresh failed, keeping last events");
                    let delay = backoff;
                    backoff = (backoff * 2).min(self.interval);
                    delay
                }
            };

            tokio::time::sleep(delay).await;
        }
    }
}
