//! Bulk status transitions and deletion
//!
//! Batches are processed one credit at a time. There is no batch
//! transaction: if credit N fails, credits before it stay updated and
//! credits after it are not touched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use core_kernel::{CreditId, PortError};
use crate::credit::{Collectibility, Credit, CreditStatus};
use crate::error::CreditError;
use crate::ports::CreditPort;

/// A status change applied to many credits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub ids: Vec<CreditId>,
    pub new_status: CreditStatus,
    /// Defaults to the status' canonical tier
    #[serde(default)]
    pub collectibility: Option<Collectibility>,
    /// Keeps the stored date when omitted
    #[serde(default)]
    pub last_payment_date: Option<NaiveDate>,
}

/// Counts reported by [`BulkStateTransitioner::set_status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateOutcome {
    pub updated_count: usize,
    pub requested_count: usize,
}

/// Counts reported by [`BulkStateTransitioner::bulk_delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteOutcome {
    pub deleted_count: usize,
    pub skipped_count: usize,
    pub requested_count: usize,
}

/// Applies status changes and deletions to batches of credits
#[derive(Clone)]
pub struct BulkStateTransitioner {
    credits: Arc<dyn CreditPort>,
}

impl BulkStateTransitioner {
    /// Creates a transitioner over the given credit store
    pub fn new(credits: Arc<dyn CreditPort>) -> Self {
        Self { credits }
    }

    /// Sets status (and collectibility) on every active credit in the batch
    ///
    /// Missing and soft-deleted credits are not counted. Moving to Lunas
    /// also forces outstanding and days past due to zero.
    ///
    /// # Errors
    ///
    /// The first storage error stops the batch; credits already written stay
    /// written.
    #[instrument(skip(self, change), fields(status = %change.new_status, requested = change.ids.len()))]
    pub async fn set_status(&self, change: StatusChange) -> Result<BulkUpdateOutcome, CreditError> {
        let mut updated_count = 0;

        for id in distinct(&change.ids) {
            let Some(mut credit) = self.active_credit(id).await? else {
                debug!(credit_id = %id, "Skipping missing or deleted credit");
                continue;
            };

            credit.set_status(change.new_status, change.collectibility, change.last_payment_date);
            self.credits.save_credit(&credit).await?;
            updated_count += 1;
        }

        info!(updated_count, "Bulk status change finished");

        Ok(BulkUpdateOutcome {
            updated_count,
            requested_count: change.ids.len(),
        })
    }

    /// Soft-deletes every Lunas credit in the batch; all others are skipped
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[CreditId]) -> Result<BulkDeleteOutcome, CreditError> {
        let mut deleted_count = 0;
        let mut skipped_count = 0;

        for id in distinct(ids) {
            let Some(mut credit) = self.active_credit(id).await? else {
                skipped_count += 1;
                continue;
            };

            if credit.soft_delete().is_err() {
                debug!(credit_id = %id, status = %credit.status, "Skipping credit that is not paid off");
                skipped_count += 1;
                continue;
            }

            self.credits.save_credit(&credit).await?;
            deleted_count += 1;
        }

        info!(deleted_count, skipped_count, "Bulk delete finished");

        Ok(BulkDeleteOutcome {
            deleted_count,
            skipped_count,
            requested_count: ids.len(),
        })
    }

    /// Soft-deletes one credit
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the credit is active and Lunas
    #[instrument(skip(self), fields(credit_id = %id))]
    pub async fn delete(&self, id: CreditId) -> Result<Credit, CreditError> {
        let mut credit = self.credits.get_credit(id).await?;
        credit.soft_delete()?;
        Ok(self.credits.save_credit(&credit).await?)
    }

    async fn active_credit(&self, id: CreditId) -> Result<Option<Credit>, CreditError> {
        match self.credits.get_credit(id).await {
            Ok(credit) if credit.is_active => Ok(Some(credit)),
            Ok(_) => Ok(None),
            Err(PortError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ids in request order with repeats removed
fn distinct(ids: &[CreditId]) -> Vec<CreditId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
