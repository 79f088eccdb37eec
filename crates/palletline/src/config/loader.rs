use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::{ArticleConfig, Config, WorkplaceConfig};
use crate::error::ConfigError;
use crate::scan::batch_id::PALLET_BATCH_LEN;
use crate::scan::code::{QrCode, MIN_CODE_LEN};

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");
const DEFAULT_CONFIG_JSON: &str = include_str!("../../config/default.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// The built-in configuration shipped with the crate.
pub fn default_config() -> Result<Config, ConfigError> {
    load_config_from_str(DEFAULT_CONFIG_JSON)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let mut workplace_ids = HashSet::new();
    for workplace in &config.workplaces {
        if !workplace_ids.insert(workplace.id.as_str()) {
            return Err(ConfigError::InvalidWorkplace {
                id: workplace.id.clone(),
                reason: "Duplicate workplace ID".to_string(),
            });
        }
        validate_workplace(workplace)?;
    }

    if config.inventory.max_positions_per_card == 0 {
        return Err(ConfigError::Validation {
            message: "inventory.max_positions_per_card must be at least 1".to_string(),
        });
    }

    let mut warehouse_ids = HashSet::new();
    for warehouse in &config.inventory.warehouses {
        if !warehouse_ids.insert(warehouse.id.as_str()) {
            return Err(ConfigError::InvalidWarehouse {
                id: warehouse.id.clone(),
                reason: "Duplicate warehouse ID".to_string(),
            });
        }
        let mut bins = HashSet::new();
        if let Some(dup) = warehouse.bins.iter().find(|b| !bins.insert(b.as_str())) {
            return Err(ConfigError::InvalidWarehouse {
                id: warehouse.id.clone(),
                reason: format!("Duplicate bin '{}'", dup),
            });
        }
    }

    Ok(())
}

fn validate_workplace(workplace: &WorkplaceConfig) -> Result<(), ConfigError> {
    let mut articles = HashSet::new();
    for article in &workplace.articles {
        let invalid = |reason: &str| ConfigError::InvalidArticle {
            workplace: workplace.id.clone(),
            article: article.article.clone(),
            reason: reason.to_string(),
        };

        if !articles.insert(article.article.as_str()) {
            return Err(invalid("Duplicate article"));
        }
        if article.pallet_size == 0 {
            return Err(invalid("pallet_size must be at least 1"));
        }
        if article.box_size == 0 {
            return Err(invalid("box_size must be at least 1"));
        }
        if article.hydra_process.trim().is_empty() || article.pallet_process.trim().is_empty() {
            return Err(invalid("process codes must not be empty"));
        }
        if article.article.contains('|') || article.pallet_process.contains('|') {
            return Err(invalid("'|' is reserved as the label separator"));
        }
        let label_len = shortest_pallet_label(article);
        if label_len < MIN_CODE_LEN {
            return Err(invalid(&format!(
                "a one-box pallet label would be {} characters, scanners accept {} or more",
                label_len, MIN_CODE_LEN
            )));
        }
    }

    Ok(())
}

/// Length of the label minted for a pallet holding a single box.
fn shortest_pallet_label(article: &ArticleConfig) -> usize {
    QrCode::pallet(
        &article.article,
        &article.pallet_process,
        article.box_size,
        &"0".repeat(PALLET_BATCH_LEN),
    )
    .to_string()
    .chars()
    .count()
}
