//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use palletline::config::{
    ArticleConfig, Config, InventoryConfig, WarehouseConfig, WorkplaceConfig,
};

/// Builder for creating `Config` instances.
pub struct ConfigBuilder {
    version: String,
    workplaces: Vec<WorkplaceConfig>,
    inventory: InventoryConfig,
}

impl ConfigBuilder {
    /// Create an empty config with no workplaces and no warehouses.
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            workplaces: vec![],
            inventory: InventoryConfig::default(),
        }
    }

    /// Add an article to a workplace, creating the workplace if needed.
    pub fn article(mut self, workplace: &str, article: ArticleConfig) -> Self {
        match self.workplaces.iter_mut().find(|w| w.id == workplace) {
            Some(existing) => existing.articles.push(article),
            None => self.workplaces.push(WorkplaceConfig {
                id: workplace.to_string(),
                name: None,
                articles: vec![article],
            }),
        }
        self
    }

    pub fn warehouse(mut self, id: &str, bins: &[&str]) -> Self {
        self.inventory.warehouses.push(WarehouseConfig {
            id: id.to_string(),
            name: None,
            bins: bins.iter().map(|b| b.to_string()).collect(),
        });
        self
    }

    pub fn max_positions(mut self, max: u32) -> Self {
        self.inventory.max_positions_per_card = max;
        self
    }

    pub fn build(self) -> Config {
        Config {
            version: self.version,
            database_path: None,
            workplaces: self.workplaces,
            inventory: self.inventory,
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An article packed `box_size` per box and `pallet_size` boxes per pallet,
/// with box process `050` and pallet process `059`.
pub fn article(number: &str, pallet_size: u32, box_size: u32) -> ArticleConfig {
    ArticleConfig {
        article: number.to_string(),
        name: format!("Article {}", number),
        kind: "136".to_string(),
        pallet_size,
        box_size,
        hydra_process: "050".to_string(),
        pallet_process: "059".to_string(),
    }
}

/// Builder for box label payloads.
#[derive(Clone)]
pub struct BoxCode {
    article: String,
    process: String,
    quantity: u32,
    batch: String,
    flag: String,
}

impl BoxCode {
    pub fn new(article: &str, quantity: u32) -> Self {
        Self {
            article: article.to_string(),
            process: "050".to_string(),
            quantity,
            batch: batch_id("HB", 1),
            flag: "F".to_string(),
        }
    }

    pub fn process(mut self, process: &str) -> Self {
        self.process = process.to_string();
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn batch(mut self, batch: &str) -> Self {
        self.batch = batch.to_string();
        self
    }

    pub fn build(self) -> String {
        format!(
            "A:{}|O:{}|Q:{}|B:{}|C:{}",
            self.article, self.process, self.quantity, self.batch, self.flag
        )
    }
}

/// A ten character batch id: `prefix` padded with the number.
pub fn batch_id(prefix: &str, n: u32) -> String {
    format!("{}{:0width$}", prefix, n, width = 10 - prefix.len())
}

pub fn operators() -> Vec<String> {
    vec!["4711".to_string(), "0815".to_string()]
}
