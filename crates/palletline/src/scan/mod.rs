//! End-of-line box and pallet scanning.

pub mod batch_id;
pub mod code;
pub mod error;
pub mod outcome;
pub mod record;
pub mod station;

pub use code::{CodeError, QrCode};
pub use error::ScanError;
pub use outcome::{LabelOutcome, PalletCloseOutcome, PalletState, ReworkStatus, ScanStatus};
pub use record::{BoxStatus, ScanRecord};
pub use station::ScanStation;
