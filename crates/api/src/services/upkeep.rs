//! Expiry sweep for pins.
//!
//! Deactivates every active pin whose end date has passed and refunds the
//! units of social pins to their owner. Each pin is handled in its own
//! transaction, so one failure never blocks the rest of the sweep.

use chrono::{DateTime, Utc};
use domain::models::{Pin, PinType};
use metrics::counter;
use persistence::repositories::{PinRepository, UserRepository};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Expired pin ids fetched per page while sweeping.
pub const SWEEP_PAGE_SIZE: i64 = 1_000;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Expired pins the sweep looked at.
    pub scanned: usize,
    /// Pins this sweep deactivated.
    pub expired: usize,
    pub social_pins_refunded: i64,
    /// Pins skipped after an error.
    pub failed: usize,
}

pub struct UpkeepService {
    pool: PgPool,
    pins: PinRepository,
}

impl UpkeepService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pins: PinRepository::new(pool.clone()),
            pool,
        }
    }

    /// Sweeps only when at least one active pin has expired.
    pub async fn run_if_needed(&self, now: DateTime<Utc>) -> Result<SweepReport, sqlx::Error> {
        let expired = self.pins.count_expired(now).await?;
        if expired == 0 {
            return Ok(SweepReport::default());
        }

        debug!(expired, "Expired pins found");
        self.sweep(now).await
    }

    /// Sweeps unconditionally.
    pub async fn force(&self, now: DateTime<Utc>) -> Result<SweepReport, sqlx::Error> {
        self.sweep(now).await
    }

    /// Runs [`Self::run_if_needed`] and logs instead of failing.
    ///
    /// Used after requests that change pins or balances.
    pub async fn run_inline(&self) {
        if let Err(e) = self.run_if_needed(Utc::now()).await {
            error!(error = %e, "Inline pin upkeep failed");
        }
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, sqlx::Error> {
        let mut report = SweepReport::default();
        let mut after = None;

        // Keyset pages: each expired pin is visited once, failed ones included.
        loop {
            let ids = self.pins.find_expired_ids(now, after, SWEEP_PAGE_SIZE).await?;
            let Some(&last) = ids.last() else {
                break;
            };
            after = Some(last);
            report.scanned += ids.len();

            for pin_id in ids {
                match self.expire_one(pin_id).await {
                    Ok(Some(refunded)) => {
                        report.expired += 1;
                        report.social_pins_refunded += i64::from(refunded);
                    }
                    // Someone else deactivated it first.
                    Ok(None) => {}
                    Err(e) => {
                        report.failed += 1;
                        error!(pin_id = %pin_id, error = %e, "Failed to expire pin");
                    }
                }
            }
        }

        if report.expired > 0 || report.failed > 0 {
            info!(
                scanned = report.scanned,
                expired = report.expired,
                social_pins_refunded = report.social_pins_refunded,
                failed = report.failed,
                "Pin upkeep sweep finished"
            );
        }

        Ok(report)
    }

    /// Deactivates one pin and refunds it. Returns the units refunded, or
    /// `None` if the pin was no longer active.
    async fn expire_one(&self, pin_id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(entity) = PinRepository::deactivate(&mut *tx, pin_id).await? else {
            return Ok(None);
        };
        let pin = Pin::from(entity);

        let refund = pin.refund();
        if refund > 0 {
            let credited =
                UserRepository::credit(&mut *tx, pin.user_id, PinType::Social, refund).await?;
            if credited.is_none() {
                warn!(pin_id = %pin.id, user_id = %pin.user_id, "Pin owner missing, refund skipped");
            }
        }

        tx.commit().await?;

        counter!("pins_expired_total", "pin_type" => pin.pin_type.as_str()).increment(1);
        debug!(pin_id = %pin.id, pin_type = %pin.pin_type, refund, "Pin expired");

        Ok(Some(refund))
    }
}
