//! Inventory repository: article master data, bin options, cards and positions.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;

/// A row of `inventory_articles`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRow {
    pub number: String,
    pub name: String,
    pub unit: String,
}

impl ArticleRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            number: row.get("number")?,
            name: row.get("name")?,
            unit: row.get("unit")?,
        })
    }
}

/// A row of `inventory_cards`. `creators` is a JSON array.
#[derive(Debug, Clone)]
pub struct CardRow {
    pub number: u32,
    pub warehouse: String,
    pub creators: String,
    pub created_at: String,
}

impl CardRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            number: row.get("number")?,
            warehouse: row.get("warehouse")?,
            creators: row.get("creators")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// A row of `inventory_positions`. `operators` is a JSON array.
#[derive(Debug, Clone)]
pub struct PositionRow {
    pub card_number: u32,
    pub position: u32,
    pub identifier: String,
    pub article_number: String,
    pub article_name: String,
    pub unit: String,
    pub quantity: f64,
    pub wip: bool,
    pub bin: Option<String>,
    pub time: String,
    pub operators: String,
}

impl PositionRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            card_number: row.get("card_number")?,
            position: row.get("position")?,
            identifier: row.get("identifier")?,
            article_number: row.get("article_number")?,
            article_name: row.get("article_name")?,
            unit: row.get("unit")?,
            quantity: row.get("quantity")?,
            wip: row.get("wip")?,
            bin: row.get("bin")?,
            time: row.get("time")?,
            operators: row.get("operators")?,
        })
    }
}

/// Inserts or replaces one article by number.
pub fn upsert_article(conn: &Connection, article: &ArticleRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO inventory_articles (number, name, unit) VALUES (?1, ?2, ?3)
         ON CONFLICT(number) DO UPDATE SET name = excluded.name, unit = excluded.unit",
        params![article.number, article.name, article.unit],
    )?;
    Ok(())
}

pub fn find_article(conn: &Connection, number: &str) -> Result<Option<ArticleRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM inventory_articles WHERE number = ?1",
            params![number],
            ArticleRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Searches articles by number prefix or case-insensitive name substring.
///
/// Number matches rank first; ties are ordered by number.
pub fn search_articles(
    conn: &Connection,
    query: &str,
    limit: u32,
) -> Result<Vec<ArticleRow>, DatabaseError> {
    let pattern = escape_like(query);
    let mut stmt = conn.prepare(
        "SELECT number, name, unit FROM inventory_articles
         WHERE number LIKE ?1 || '%' ESCAPE '\\'
            OR LOWER(name) LIKE '%' || LOWER(?1) || '%' ESCAPE '\\'
         ORDER BY CASE WHEN number LIKE ?1 || '%' ESCAPE '\\' THEN 0 ELSE 1 END, number
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![pattern, limit], ArticleRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Replaces the bin options of one warehouse, keeping the given order.
pub fn replace_bin_options(
    conn: &Connection,
    warehouse: &str,
    bins: &[String],
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM inventory_bin_options WHERE warehouse = ?1",
        params![warehouse],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO inventory_bin_options (warehouse, value, sort_order) VALUES (?1, ?2, ?3)",
    )?;
    for (i, bin) in bins.iter().enumerate() {
        stmt.execute(params![warehouse, bin, i as i64])?;
    }
    Ok(())
}

pub fn list_bin_options(conn: &Connection, warehouse: &str) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT value FROM inventory_bin_options WHERE warehouse = ?1 ORDER BY sort_order",
    )?;
    let bins = stmt
        .query_map(params![warehouse], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(bins)
}

/// The lowest positive card number not in use.
pub fn lowest_free_card_number(conn: &Connection) -> Result<u32, DatabaseError> {
    let number: u32 = conn.query_row(
        "SELECT CASE
            WHEN NOT EXISTS (SELECT 1 FROM inventory_cards WHERE number = 1) THEN 1
            ELSE (SELECT MIN(c.number + 1) FROM inventory_cards c
                  WHERE NOT EXISTS (SELECT 1 FROM inventory_cards d WHERE d.number = c.number + 1))
         END",
        [],
        |r| r.get(0),
    )?;
    Ok(number)
}

pub fn insert_card(conn: &Connection, card: &CardRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO inventory_cards (number, warehouse, creators, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![card.number, card.warehouse, card.creators, card.created_at],
    )?;
    Ok(())
}

pub fn find_card(conn: &Connection, number: u32) -> Result<Option<CardRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM inventory_cards WHERE number = ?1",
            params![number],
            CardRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Inserts a position or overwrites the one at the same (card, position).
pub fn upsert_position(conn: &Connection, position: &PositionRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO inventory_positions (card_number, position, identifier, article_number,
         article_name, unit, quantity, wip, bin, time, operators)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(card_number, position) DO UPDATE SET
           identifier = excluded.identifier,
           article_number = excluded.article_number,
           article_name = excluded.article_name,
           unit = excluded.unit,
           quantity = excluded.quantity,
           wip = excluded.wip,
           bin = excluded.bin,
           time = excluded.time,
           operators = excluded.operators",
        params![
            position.card_number,
            position.position,
            position.identifier,
            position.article_number,
            position.article_name,
            position.unit,
            position.quantity,
            position.wip,
            position.bin,
            position.time,
            position.operators,
        ],
    )?;
    Ok(())
}

pub fn list_positions(conn: &Connection, card_number: u32) -> Result<Vec<PositionRow>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT * FROM inventory_positions WHERE card_number = ?1 ORDER BY position")?;
    let rows = stmt
        .query_map(params![card_number], PositionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Position numbers already used on a card, ascending.
pub fn used_positions(conn: &Connection, card_number: u32) -> Result<Vec<u32>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT position FROM inventory_positions WHERE card_number = ?1 ORDER BY position",
    )?;
    let used = stmt
        .query_map(params![card_number], |r| r.get(0))?
        .collect::<Result<Vec<u32>, _>>()?;
    Ok(used)
}
