//! Test harness for isolated test execution.
//!
//! Every harness owns its own in-memory database, so tests never share
//! pallets, cards or batch ids.

#![allow(dead_code)]

use std::sync::Arc;

use palletline::config::{default_config, Config};
use palletline::{ArticleCatalog, Database, InventoryDesk, ScanStation};

use super::builders::{batch_id, operators, BoxCode};

pub struct TestHarness {
    pub config: Config,
    pub db: Database,
    pub station: ScanStation,
    pub desk: InventoryDesk,
}

impl TestHarness {
    /// Harness over the built-in configuration.
    pub fn new() -> Self {
        Self::with_config(default_config().expect("built-in config must load"))
    }

    pub fn with_config(config: Config) -> Self {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        Self::with_database(config, db)
    }

    /// Harness over an existing database, e.g. a file-backed one.
    pub fn with_database(config: Config, db: Database) -> Self {
        let catalog = Arc::new(ArticleCatalog::from_config(&config));
        let station = ScanStation::new(db.clone(), catalog);
        let desk =
            InventoryDesk::open(db.clone(), &config.inventory).expect("Failed to open desk");
        Self {
            config,
            db,
            station,
            desk,
        }
    }

    /// Scans `count` boxes with sequential batch ids starting at `first`.
    pub fn scan_boxes(&self, workplace: &str, code: &BoxCode, first: u32, count: u32) {
        for n in first..first + count {
            let raw = code.clone().batch(&batch_id("HB", n)).build();
            let status = self.station.save_hydra_batch(workplace, &raw, &operators());
            assert_eq!(
                status,
                palletline::ScanStatus::Saved,
                "box {} was not saved",
                raw
            );
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
