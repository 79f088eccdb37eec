use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PalletlineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Failed to read import file '{path}': {source}")]
    ReadImport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse import file: {0}")]
    ParseImport(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid workplace '{id}': {reason}")]
    InvalidWorkplace { id: String, reason: String },

    #[error("Invalid article '{article}' at workplace '{workplace}': {reason}")]
    InvalidArticle {
        workplace: String,
        article: String,
        reason: String,
    },

    #[error("Invalid warehouse '{id}': {reason}")]
    InvalidWarehouse { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PalletlineError>;
