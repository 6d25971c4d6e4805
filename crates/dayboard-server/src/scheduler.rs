//! Background refresh timer.
//!
//! One attempt at startup when a token is already stored, then one per
//! interval until shutdown. Failures are left to the [`Refresher`]'s
//! bookkeeping; the loop itself never stops because of them.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::refresh::{RefreshTrigger, Refresher};
use crate::signals::ShutdownSignal;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between interval attempts.
    pub interval: Duration,
    /// Whether to attempt once at startup (only when a token is stored).
    pub refresh_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            refresh_on_start: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    pub fn with_refresh_on_start(mut self, enabled: bool) -> Self {
        self.refresh_on_start = enabled;
        self
    }
}

/// The refresh loop.
pub struct Scheduler {
    config: SchedulerConfig,
    refresher: Arc<Refresher>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, refresher: Arc<Refresher>) -> Self {
        Self { config, refresher }
    }

    /// Runs until `shutdown` fires.
    pub async fn run(self, shutdown: ShutdownSignal) {
        let Self { config, refresher } = self;

        info!(interval_secs = config.interval.as_secs(), "Scheduler started");

        if config.refresh_on_start && refresher.has_token() {
            info!("initial calendar fetch on startup");
            refresher.refresh(RefreshTrigger::Startup).await;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = shutdown.wait();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopping on shutdown");
                    break;
                }
                _ = ticker.tick() => {
                    debug!("interval calendar refresh");
                    refresher.refresh(RefreshTrigger::Interval).await;
                }
            }
        }
    }
}
