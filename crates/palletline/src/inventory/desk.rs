//! Inventory counting: cards, positions and article lookup.

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info, info_span, warn};

use super::model::{position_identifier, Article, InventoryCard, Position, PositionDraft, Unit};
use super::outcome::{CardStatus, PositionStatus};
use crate::config::InventoryConfig;
use crate::db::inventory_repo::{self, ArticleRow, CardRow, PositionRow};
use crate::db::{decode_list, encode_list, now_rfc3339, Database, DatabaseError};
use crate::error::PalletlineError;
use crate::sanitize::{normalize_operators, redact_operators};

/// Queries shorter than this return no articles.
pub const MIN_QUERY_LEN: usize = 3;

pub struct InventoryDesk {
    db: Database,
    warehouses: HashSet<String>,
    max_positions: u32,
}

impl InventoryDesk {
    /// Creates the desk and syncs configured bin options into the database.
    pub fn open(db: Database, config: &InventoryConfig) -> Result<Self, DatabaseError> {
        db.with_transaction(|conn| {
            for warehouse in &config.warehouses {
                inventory_repo::replace_bin_options(conn, &warehouse.id, &warehouse.bins)?;
            }
            Ok(())
        })?;

        Ok(Self {
            db,
            warehouses: config.warehouses.iter().map(|w| w.id.clone()).collect(),
            max_positions: config.max_positions_per_card,
        })
    }

    pub fn max_positions(&self) -> u32 {
        self.max_positions
    }

    /// Opens a card under the lowest unused card number.
    pub fn create_card(&self, warehouse: &str, operators: &[String]) -> CardStatus {
        let span = info_span!(
            "create_card",
            warehouse = %warehouse,
            operators = %redact_operators(operators),
        );
        let _enter = span.enter();

        let operators = normalize_operators(operators);
        if operators.is_empty() {
            return CardStatus::Invalid;
        }
        if !self.warehouses.contains(warehouse) {
            warn!("Card requested for unknown warehouse");
            return CardStatus::UnknownWarehouse;
        }

        let result = encode_list("creators", &operators).and_then(|creators| {
            self.db.with_transaction(|conn| {
                let number = inventory_repo::lowest_free_card_number(conn)?;
                inventory_repo::insert_card(
                    conn,
                    &CardRow {
                        number,
                        warehouse: warehouse.to_string(),
                        creators,
                        created_at: now_rfc3339(),
                    },
                )?;
                Ok(number)
            })
        });

        match result {
            Ok(number) => {
                info!(card = number, "Inventory card created");
                CardStatus::Created { number }
            }
            Err(e) => {
                error!(error = %e, "Inventory card creation failed");
                CardStatus::Error
            }
        }
    }

    /// A card with its positions in position order.
    pub fn card(&self, number: u32) -> Result<Option<InventoryCard>, DatabaseError> {
        self.db.with_conn(|conn| {
            let Some(card) = inventory_repo::find_card(conn, number)? else {
                return Ok(None);
            };
            let positions = inventory_repo::list_positions(conn, number)?
                .into_iter()
                .map(position_from_row)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(InventoryCard {
                number: card.number,
                warehouse: card.warehouse,
                creators: decode_list("creators", Some(card.creators))?,
                created_at: card.created_at,
                positions,
            }))
        })
    }

    /// Articles matching `query` by number prefix or name.
    pub fn find_articles(&self, query: &str, limit: u32) -> Result<Vec<Article>, DatabaseError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN || limit == 0 {
            return Ok(Vec::new());
        }
        let rows = self
            .db
            .with_conn(|conn| inventory_repo::search_articles(conn, query, limit))?;
        rows.into_iter().map(article_from_row).collect()
    }

    /// The lowest free position on a card, or `None` when it is full.
    pub fn next_free_position(&self, card: u32) -> Result<Option<u32>, DatabaseError> {
        let used = self
            .db
            .with_conn(|conn| inventory_repo::used_positions(conn, card))?;
        Ok(first_gap(&used, self.max_positions))
    }

    pub fn bin_options(&self, warehouse: &str) -> Result<Vec<String>, DatabaseError> {
        self.db
            .with_conn(|conn| inventory_repo::list_bin_options(conn, warehouse))
    }

    /// Records one counted position, overwriting the slot if already used.
    pub fn save_position(&self, draft: &PositionDraft) -> PositionStatus {
        let span = info_span!(
            "save_position",
            card = draft.card,
            article = %draft.article,
            operators = %redact_operators(&draft.operators),
        );
        let _enter = span.enter();

        match self.try_save_position(draft) {
            Ok(PositionStatus::Saved { identifier }) => {
                info!(identifier = %identifier, "Position saved");
                PositionStatus::Saved { identifier }
            }
            Ok(status) => {
                warn!(status = ?status, "Position rejected");
                status
            }
            Err(e) => {
                error!(error = %e, "Position save failed");
                PositionStatus::Error
            }
        }
    }

    fn try_save_position(&self, draft: &PositionDraft) -> Result<PositionStatus, DatabaseError> {
        let operators = normalize_operators(&draft.operators);
        if operators.is_empty() {
            return Ok(PositionStatus::Invalid);
        }
        let operators = encode_list("operators", &operators)?;
        let article_number = draft.article.trim();
        let bin = draft
            .bin
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());
        let max = self.max_positions;

        self.db.with_transaction(|conn| {
            let Some(card) = inventory_repo::find_card(conn, draft.card)? else {
                return Ok(PositionStatus::CardNotFound);
            };

            let position = match draft.position {
                Some(p) if p == 0 || p > max => return Ok(PositionStatus::InvalidPosition),
                Some(p) => p,
                None => {
                    let used = inventory_repo::used_positions(conn, card.number)?;
                    match first_gap(&used, max) {
                        Some(p) => p,
                        None => return Ok(PositionStatus::CardFull),
                    }
                }
            };

            let Some(article) = inventory_repo::find_article(conn, article_number)? else {
                return Ok(PositionStatus::ArticleNotFound);
            };
            let article = article_from_row(article)?;
            if !article.unit.accepts(draft.quantity) {
                return Ok(PositionStatus::InvalidQuantity);
            }

            let bins = inventory_repo::list_bin_options(conn, &card.warehouse)?;
            let bin_ok = match bin {
                Some(b) => bins.iter().any(|known| known == b),
                None => bins.is_empty(),
            };
            if !bin_ok {
                return Ok(PositionStatus::WrongBin);
            }

            let identifier = position_identifier(card.number, position);
            inventory_repo::upsert_position(
                conn,
                &PositionRow {
                    card_number: card.number,
                    position,
                    identifier: identifier.clone(),
                    article_number: article.number,
                    article_name: article.name,
                    unit: article.unit.as_str().to_string(),
                    quantity: draft.quantity,
                    wip: draft.wip,
                    bin: bin.map(str::to_string),
                    time: now_rfc3339(),
                    operators: operators.clone(),
                },
            )?;
            Ok(PositionStatus::Saved { identifier })
        })
    }

    /// Upserts article master data. Returns how many articles were written.
    pub fn import_articles(&self, articles: &[Article]) -> Result<usize, DatabaseError> {
        let count = self.db.with_transaction(|conn| {
            for article in articles {
                inventory_repo::upsert_article(
                    conn,
                    &ArticleRow {
                        number: article.number.trim().to_string(),
                        name: article.name.trim().to_string(),
                        unit: article.unit.as_str().to_string(),
                    },
                )?;
            }
            Ok(articles.len())
        })?;
        info!(count, "Articles imported");
        Ok(count)
    }

    /// Reads a JSON array of articles from disk and imports it.
    pub fn import_articles_file(&self, path: &Path) -> Result<usize, PalletlineError> {
        let content = std::fs::read_to_string(path).map_err(|e| PalletlineError::ReadImport {
            path: path.to_path_buf(),
            source: e,
        })?;
        let articles: Vec<Article> = serde_json::from_str(&content)?;
        Ok(self.import_articles(&articles)?)
    }
}

/// Lowest number in `1..=max` missing from the ascending list `used`.
fn first_gap(used: &[u32], max: u32) -> Option<u32> {
    let mut expected = 1;
    for &p in used {
        if p > expected {
            break;
        }
        if p == expected {
            expected += 1;
        }
    }
    (expected <= max).then_some(expected)
}

fn parse_unit(raw: &str) -> Result<Unit, DatabaseError> {
    raw.parse::<Unit>().map_err(|reason| {
        DatabaseError::Sqlite(rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            reason.into(),
        ))
    })
}

fn article_from_row(row: ArticleRow) -> Result<Article, DatabaseError> {
    Ok(Article {
        unit: parse_unit(&row.unit)?,
        number: row.number,
        name: row.name,
    })
}

fn position_from_row(row: PositionRow) -> Result<Position, DatabaseError> {
    Ok(Position {
        position: row.position,
        identifier: row.identifier,
        article_number: row.article_number,
        article_name: row.article_name,
        unit: parse_unit(&row.unit)?,
        quantity: row.quantity,
        wip: row.wip,
        bin: row.bin,
        time: row.time,
        operators: decode_list("operators", Some(row.operators))?,
    })
}
