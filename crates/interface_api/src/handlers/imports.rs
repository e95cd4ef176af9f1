//! Import handlers
//!
//! Both endpoints answer 200 with a report even when some rows fail; only a
//! file whose layout cannot be recognized is rejected outright.

use axum::{extract::State, Json};
use tracing::instrument;
use validator::Validate;

use domain_import::ImportReport;

use crate::dto::imports::ImportRequest;
use crate::{error::ApiError, AppState};

#[instrument(skip(state, request), fields(rows = request.rows.len()))]
pub async fn import_credits(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportReport>, ApiError> {
    request.validate()?;
    let report = state.imports.import_credits(&request.into_raw_rows()).await?;
    Ok(Json(report))
}

#[instrument(skip(state, request), fields(rows = request.rows.len()))]
pub async fn import_payments(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportReport>, ApiError> {
    request.validate()?;
    let report = state.imports.import_payments(&request.into_raw_rows()).await?;
    Ok(Json(report))
}
