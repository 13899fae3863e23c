//! Common DTO types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Offset pagination block
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total matching items
    pub total: u64,
    /// Page size actually applied
    pub limit: u32,
    /// Items skipped
    pub skip: u32,
    /// More items exist past this page
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: u64, limit: u32, skip: u32) -> Self {
        Self {
            total,
            limit,
            skip,
            has_more: u64::from(skip) + u64::from(limit) < total,
        }
    }
}
