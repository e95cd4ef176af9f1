//! Credit handlers

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;
use validator::Validate;

use core_kernel::CreditId;
use domain_credit::{BulkDeleteOutcome, BulkUpdateOutcome};

use super::parse_id;
use crate::dto::credits::{BulkDeleteRequest, CreditResponse, StatusChangeRequest};
use crate::dto::payments::PaymentResponse;
use crate::{error::ApiError, AppState};

/// Gets a credit by ID
pub async fn get_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreditResponse>, ApiError> {
    let credit_id: CreditId = parse_id(&id, "credit")?;
    let credit = state
        .credits
        .get_credit(credit_id)
        .await
        .map_err(domain_credit::CreditError::from)?;
    Ok(Json(credit.into()))
}

/// Lists the active payments of a credit, newest first
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let credit_id: CreditId = parse_id(&id, "credit")?;
    let payments = state.ledger.payments_for(credit_id).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Soft-deletes a single Lunas credit
#[instrument(skip(state))]
pub async fn delete_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreditResponse>, ApiError> {
    let credit_id: CreditId = parse_id(&id, "credit")?;
    let credit = state.transitions.delete(credit_id).await?;
    Ok(Json(credit.into()))
}

/// Applies a status change to a batch of credits
#[instrument(skip(state, request), fields(status = %request.new_status, requested = request.ids.len()))]
pub async fn set_status(
    State(state): State<AppState>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<BulkUpdateOutcome>, ApiError> {
    request.validate()?;
    let outcome = state.transitions.set_status(request.into()).await?;
    Ok(Json(outcome))
}

/// Soft-deletes the Lunas credits of a batch
#[instrument(skip(state, request), fields(requested = request.ids.len()))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteOutcome>, ApiError> {
    request.validate()?;
    let outcome = state.transitions.bulk_delete(&request.ids).await?;
    Ok(Json(outcome))
}
