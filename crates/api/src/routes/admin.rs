//! Admin-only operations.

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::services::upkeep::{SweepReport, UpkeepService};

/// Run the pin expiry sweep now, whether or not anything looks expired.
///
/// POST /api/v1/admin/upkeep
pub async fn run_upkeep(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<SweepReport>, ApiError> {
    let report = UpkeepService::new(state.pool.clone())
        .force(Utc::now())
        .await?;

    info!(
        admin_id = %admin.id,
        expired = report.expired,
        failed = report.failed,
        "Manual pin upkeep finished"
    );

    Ok(Json(report))
}
