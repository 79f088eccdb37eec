//! Box scan records and their lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a scanned box currently is.
///
/// A box enters as `Pallet` and leaves that state exactly once, either to
/// `Warehouse` when its pallet is closed or to `Rework` when pulled off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxStatus {
    Pallet,
    Warehouse,
    Rework,
}

impl BoxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxStatus::Pallet => "pallet",
            BoxStatus::Warehouse => "warehouse",
            BoxStatus::Rework => "rework",
        }
    }

    /// Whether `self -> next` is an allowed transition.
    pub fn can_transition_to(&self, next: BoxStatus) -> bool {
        matches!(
            (self, next),
            (BoxStatus::Pallet, BoxStatus::Warehouse) | (BoxStatus::Pallet, BoxStatus::Rework)
        )
    }
}

impl fmt::Display for BoxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pallet" => Ok(BoxStatus::Pallet),
            "warehouse" => Ok(BoxStatus::Warehouse),
            "rework" => Ok(BoxStatus::Rework),
            other => Err(format!("unknown box status '{}'", other)),
        }
    }
}

/// A stored box scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: i64,
    pub status: BoxStatus,
    pub workplace: String,
    pub article: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub time: String,
    pub hydra_batch: String,
    pub hydra_operators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pallet_batch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pallet_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pallet_operators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rework_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rework_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rework_operators: Vec<String>,
}
