pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod sanitize;
pub mod scan;

pub use config::{load_config, ArticleCatalog, ArticleSpec, Config};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, PalletlineError, Result};
pub use inventory::{CardStatus, InventoryDesk, PositionDraft, PositionStatus};
pub use scan::{
    BoxStatus, LabelOutcome, PalletCloseOutcome, QrCode, ReworkStatus, ScanRecord, ScanStation,
    ScanStatus,
};
