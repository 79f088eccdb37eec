//! Tagged outcomes of the scanning operations.
//!
//! Every outcome serializes as an object with a `status` field holding the
//! user-facing discriminant, e.g. `{"status": "wrong article"}`.

use std::fmt;

use serde::Serialize;

/// Result of scanning one box label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum ScanStatus {
    #[serde(rename = "saved")]
    Saved,
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "wrong article")]
    WrongArticle,
    #[serde(rename = "wrong quantity")]
    WrongQuantity,
    #[serde(rename = "wrong process")]
    WrongProcess,
    #[serde(rename = "full pallet")]
    FullPallet,
    #[serde(rename = "error")]
    Error,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Saved => "saved",
            ScanStatus::Exists => "exists",
            ScanStatus::Invalid => "invalid",
            ScanStatus::WrongArticle => "wrong article",
            ScanStatus::WrongQuantity => "wrong quantity",
            ScanStatus::WrongProcess => "wrong process",
            ScanStatus::FullPallet => "full pallet",
            ScanStatus::Error => "error",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fill level of the open pallet for one (workplace, article) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletState {
    pub workplace: String,
    pub article: String,
    pub box_count: u32,
    pub pallet_size: u32,
    pub box_size: u32,
    pub total_quantity: u32,
    pub is_full: bool,
}

/// Result of minting a pallet label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all_fields = "camelCase")]
pub enum LabelOutcome {
    #[serde(rename = "ready")]
    Ready {
        code: String,
        pallet_batch: String,
        box_count: u32,
        total_quantity: u32,
        is_full: bool,
    },
    #[serde(rename = "empty pallet")]
    EmptyPallet,
    #[serde(rename = "wrong article")]
    WrongArticle,
    #[serde(rename = "error")]
    Error,
}

/// Result of scanning a pallet label to close the pallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all_fields = "camelCase")]
pub enum PalletCloseOutcome {
    #[serde(rename = "success")]
    Success {
        pallet_batch: String,
        moved: u32,
        total_quantity: u32,
    },
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "wrong article")]
    WrongArticle,
    #[serde(rename = "wrong process")]
    WrongProcess,
    /// The label was minted for a different box count; print a fresh one.
    #[serde(rename = "wrong quantity")]
    WrongQuantity { labelled: u32, on_pallet: u32 },
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "not saved")]
    NotSaved,
    #[serde(rename = "error")]
    Error,
}

/// Result of pulling a box off its pallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum ReworkStatus {
    #[serde(rename = "reworked")]
    Reworked,
    #[serde(rename = "not found")]
    NotFound,
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "error")]
    Error,
}
