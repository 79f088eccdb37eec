use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Counting unit of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Pieces; quantities must be whole numbers.
    #[default]
    St,
    Kg,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::St => "st",
            Unit::Kg => "kg",
        }
    }

    pub fn accepts(&self, quantity: f64) -> bool {
        quantity.is_finite() && quantity > 0.0 && (*self == Unit::Kg || quantity.fract() == 0.0)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "st" => Ok(Unit::St),
            "kg" => Ok(Unit::Kg),
            other => Err(format!("unknown unit '{}'", other)),
        }
    }
}

/// Article master data, as imported and as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position: u32,
    pub identifier: String,
    pub article_number: String,
    pub article_name: String,
    pub unit: Unit,
    pub quantity: f64,
    pub wip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    pub time: String,
    pub operators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryCard {
    pub number: u32,
    pub warehouse: String,
    pub creators: Vec<String>,
    pub created_at: String,
    pub positions: Vec<Position>,
}

/// Input for [`super::InventoryDesk::save_position`].
#[derive(Debug, Clone, Default)]
pub struct PositionDraft {
    pub card: u32,
    /// Explicit slot, or `None` for the lowest free one.
    pub position: Option<u32>,
    pub article: String,
    pub quantity: f64,
    pub bin: Option<String>,
    pub wip: bool,
    pub operators: Vec<String>,
}

/// Formats the printed `<card>/<position>` identifier.
pub fn position_identifier(card: u32, position: u32) -> String {
    format!("{}/{}", card, position)
}
