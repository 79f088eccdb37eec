use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    #[serde(default)]
    pub workplaces: Vec<WorkplaceConfig>,
    #[serde(default)]
    pub inventory: InventoryConfig,
}

/// A production station and the articles it packs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkplaceConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub articles: Vec<ArticleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleConfig {
    pub article: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Boxes per pallet.
    pub pallet_size: u32,
    /// Pieces per box.
    pub box_size: u32,
    /// Process code printed on box labels.
    pub hydra_process: String,
    /// Process code printed on pallet labels.
    pub pallet_process: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_max_positions")]
    pub max_positions_per_card: u32,
    #[serde(default)]
    pub warehouses: Vec<WarehouseConfig>,
}

fn default_max_positions() -> u32 {
    25
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_positions_per_card: default_max_positions(),
            warehouses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Allowed storage bins. Empty means the warehouse does not track bins.
    #[serde(default)]
    pub bins: Vec<String>,
}
