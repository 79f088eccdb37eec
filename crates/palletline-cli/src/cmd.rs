use anyhow::{bail, Context, Result};
use palletline::config::{default_config, load_config};
use palletline::db::default_database_path;
use palletline::{ArticleCatalog, Config, Database, InventoryDesk, PositionDraft, ScanStation};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Cli, InventoryCommands, PalletCommands};

/// Everything a subcommand needs, opened once per invocation.
pub struct App {
    pub station: ScanStation,
    pub desk: InventoryDesk,
}

impl App {
    pub fn open(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => default_config().context("Built-in config is invalid")?,
        };

        let db_path = resolve_database_path(cli.database.as_deref(), &config)?;
        tracing::debug!(path = %db_path.display(), "Opening database");
        let db = Database::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        let catalog = Arc::new(ArticleCatalog::from_config(&config));
        let desk = InventoryDesk::open(db.clone(), &config.inventory)
            .context("Failed to sync inventory bin options")?;

        Ok(Self {
            station: ScanStation::new(db, catalog),
            desk,
        })
    }
}

/// `--database` (or `PALLETLINE_DB`), then the config file, then the default location.
fn resolve_database_path(flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = &config.database_path {
        return Ok(PathBuf::from(path));
    }
    match default_database_path() {
        Some(path) => Ok(path),
        None => bail!("Could not determine a home directory; pass --database"),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

pub fn cmd_pallet(app: &App, command: &PalletCommands) -> Result<()> {
    match command {
        PalletCommands::Status { workplace, article } => {
            match app.station.pallet_state(workplace, article)? {
                Some(state) => print_json(&state),
                None => bail!("Article '{}' is not configured at '{}'", article, workplace),
            }
        }
        PalletCommands::Boxes { workplace, article } => {
            print_json(&app.station.pallet_boxes(workplace, article)?)
        }
        PalletCommands::Label { workplace, article } => {
            print_json(&app.station.pallet_label(workplace, article))
        }
        PalletCommands::Close {
            workplace,
            article,
            operators,
            code,
        } => print_json(
            &app
                .station
                .save_pallet_batch(workplace, article, code, operators),
        ),
    }
}

pub fn cmd_inventory(app: &App, command: &InventoryCommands) -> Result<()> {
    match command {
        InventoryCommands::NewCard {
            warehouse,
            operators,
        } => print_json(&app.desk.create_card(warehouse, operators)),
        InventoryCommands::Show { card } => match app.desk.card(*card)? {
            Some(card) => print_json(&card),
            None => bail!("Inventory card {} does not exist", card),
        },
        InventoryCommands::Find { query, limit } => {
            print_json(&app.desk.find_articles(query, *limit)?)
        }
        InventoryCommands::Save {
            card,
            position,
            article,
            quantity,
            bin,
            wip,
            operators,
        } => {
            let draft = PositionDraft {
                card: *card,
                position: *position,
                article: article.clone(),
                quantity: *quantity,
                bin: bin.clone(),
                wip: *wip,
                operators: operators.clone(),
            };
            print_json(&app.desk.save_position(&draft))
        }
        InventoryCommands::Bins { warehouse } => print_json(&app.desk.bin_options(warehouse)?),
        InventoryCommands::Import { file } => {
            let count = app
                .desk
                .import_articles_file(file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            print_json(&serde_json::json!({ "imported": count }))
        }
    }
}

pub fn cmd_config_check(file: &Path) -> Result<()> {
    let config =
        load_config(file).with_context(|| format!("Invalid config: {}", file.display()))?;
    let catalog = ArticleCatalog::from_config(&config);
    let articles: usize = catalog
        .workplaces()
        .map(|wp| catalog.articles(wp).count())
        .sum();

    print_json(&serde_json::json!({
        "valid": true,
        "version": config.version,
        "workplaces": catalog.workplaces().count(),
        "articles": articles,
        "warehouses": config.inventory.warehouses.len(),
    }))
}
