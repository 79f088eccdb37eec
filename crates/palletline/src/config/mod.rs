pub mod catalog;
pub mod loader;
pub mod schema;

pub use catalog::{ArticleCatalog, ArticleSpec};
pub use loader::{default_config, load_config, load_config_from_str};
pub use schema::{ArticleConfig, Config, InventoryConfig, WarehouseConfig, WorkplaceConfig};
