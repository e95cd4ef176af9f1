//! Payment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use validator::Validate;

use core_kernel::PaymentId;

use super::parse_id;
use crate::dto::credits::CreditResponse;
use crate::dto::payments::{ApplyPaymentRequest, PaymentReceiptResponse};
use crate::{error::ApiError, AppState};

/// Applies a payment to its credit
#[instrument(skip(state, request), fields(credit_id = %request.credit_id))]
pub async fn apply_payment(
    State(state): State<AppState>,
    Json(request): Json<ApplyPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentReceiptResponse>), ApiError> {
    request.validate()?;
    let receipt = state.ledger.apply(request.into()).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// Reverses a payment and returns the restored credit
#[instrument(skip(state))]
pub async fn reverse_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreditResponse>, ApiError> {
    let payment_id: PaymentId = parse_id(&id, "payment")?;
    let credit = state.ledger.reverse(payment_id).await?;
    Ok(Json(credit.into()))
}
