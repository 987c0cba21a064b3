//! Periodic pin expiry sweep.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use super::scheduler::Job;
use crate::services::upkeep::UpkeepService;

/// Runs the upkeep sweep on a timer, so pins expire even when nobody is
/// making requests.
pub struct PinUpkeepJob {
    pool: PgPool,
    interval: Duration,
}

impl PinUpkeepJob {
    pub fn new(pool: PgPool, interval_secs: u64) -> Self {
        Self {
            pool,
            interval: Duration::from_secs(interval_secs),
        }
    }
}

#[async_trait::async_trait]
impl Job for PinUpkeepJob {
    fn name(&self) -> &'static str {
        "pin_upkeep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self) -> Result<(), String> {
        UpkeepService::new(self.pool.clone())
            .run_if_needed(Utc::now())
            .await
            .map(|report| {
                if report.failed > 0 {
                    tracing::warn!(failed = report.failed, "Some pins could not be expired");
                }
            })
            .map_err(|e| format!("Pin upkeep sweep failed: {}", e))
    }
}
