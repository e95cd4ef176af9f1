//! Sequence number DTOs

use serde::Deserialize;
use validator::Validate;

use domain_credit::AllocationRequest;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    #[validate(length(max = 20))]
    pub category: String,
    pub year: i32,
    #[validate(length(max = 50))]
    pub unit_label: String,
}

impl From<AllocateRequest> for AllocationRequest {
    fn from(request: AllocateRequest) -> Self {
        AllocationRequest {
            category: request.category,
            year: request.year,
            unit_label: request.unit_label,
        }
    }
}
