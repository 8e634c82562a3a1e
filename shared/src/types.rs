//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Origin of a sales-summary row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Direct sale of a single inventory item
    Single,
    /// Disposal sale against a bulk-purchased lot
    Bulk,
    /// Free-form manually entered sale
    Manual,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Single => "single",
            SourceType::Bulk => "bulk",
            SourceType::Manual => "manual",
        }
    }
}

/// Inventory item lifecycle stages
///
/// The `status` column holds the Japanese display label, so the enum maps
/// to and from those labels rather than snake_case identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    InStock,
    Listed,
    Sold,
    RefundPending,
    RefundCompleted,
}

impl InventoryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InventoryStatus::InStock => "在庫",
            InventoryStatus::Listed => "出品中",
            InventoryStatus::Sold => "売却済み",
            InventoryStatus::RefundPending => "返金待ち",
            InventoryStatus::RefundCompleted => "返金完了",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "在庫" => Some(InventoryStatus::InStock),
            "出品中" => Some(InventoryStatus::Listed),
            "売却済み" => Some(InventoryStatus::Sold),
            "返金待ち" => Some(InventoryStatus::RefundPending),
            "返金完了" => Some(InventoryStatus::RefundCompleted),
            _ => None,
        }
    }
}

/// Sale destination label for returned goods; a row pointing at this
/// destination is a reversal, never revenue.
pub const RETURNED_LABEL: &str = "返品";
