use thiserror::Error;

/// Infrastructure failures inside the scanning workflow.
///
/// These never reach callers of [`super::ScanStation`]; they are logged and
/// reported as the `error` outcome.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Random source unavailable: {0}")]
    Random(String),

    #[error("No unused pallet batch id after {0} attempts")]
    BatchIdExhausted(usize),
}

pub type Result<T> = std::result::Result<T, ScanError>;
