//! Sequence number handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use domain_credit::AllocatedNumber;

use crate::dto::sequences::AllocateRequest;
use crate::{error::ApiError, AppState};

/// Issues the next document number, formatted per the server configuration
pub async fn allocate(
    State(state): State<AppState>,
    Json(request): Json<AllocateRequest>,
) -> Result<(StatusCode, Json<AllocatedNumber>), ApiError> {
    request.validate()?;
    let allocated = state
        .sequences
        .allocate(&request.into(), &state.numbering)
        .await?;
    Ok((StatusCode::CREATED, Json(allocated)))
}
