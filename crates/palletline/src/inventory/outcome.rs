use serde::Serialize;

/// Result of opening a new inventory card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum CardStatus {
    #[serde(rename = "created")]
    Created { number: u32 },
    #[serde(rename = "unknown warehouse")]
    UnknownWarehouse,
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "error")]
    Error,
}

/// Result of recording a counted position on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum PositionStatus {
    #[serde(rename = "saved")]
    Saved { identifier: String },
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "card not found")]
    CardNotFound,
    #[serde(rename = "invalid position")]
    InvalidPosition,
    #[serde(rename = "card full")]
    CardFull,
    #[serde(rename = "article not found")]
    ArticleNotFound,
    #[serde(rename = "invalid quantity")]
    InvalidQuantity,
    #[serde(rename = "wrong bin")]
    WrongBin,
    #[serde(rename = "error")]
    Error,
}
