//! Scan repository: queries and updates for the `scans` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{decode_list, DatabaseError};
use crate::scan::{BoxStatus, ScanRecord};

/// A raw scan row from the database. JSON list columns are still encoded.
#[derive(Debug, Clone)]
pub struct ScanRow {
    pub id: i64,
    pub status: String,
    pub workplace: String,
    pub article: String,
    pub kind: String,
    pub time: String,
    pub hydra_batch: String,
    pub hydra_operators: String,
    pub pallet_batch: Option<String>,
    pub pallet_time: Option<String>,
    pub pallet_operators: Option<String>,
    pub rework_reason: Option<String>,
    pub rework_time: Option<String>,
    pub rework_operators: Option<String>,
}

impl ScanRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            status: row.get("status")?,
            workplace: row.get("workplace")?,
            article: row.get("article")?,
            kind: row.get("type")?,
            time: row.get("time")?,
            hydra_batch: row.get("hydra_batch")?,
            hydra_operators: row.get("hydra_operators")?,
            pallet_batch: row.get("pallet_batch")?,
            pallet_time: row.get("pallet_time")?,
            pallet_operators: row.get("pallet_operators")?,
            rework_reason: row.get("rework_reason")?,
            rework_time: row.get("rework_time")?,
            rework_operators: row.get("rework_operators")?,
        })
    }

    /// Decodes the row into a domain record.
    pub fn into_record(self) -> Result<ScanRecord, DatabaseError> {
        let status = self.status.parse::<BoxStatus>().map_err(|reason| {
            DatabaseError::Sqlite(rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                reason.into(),
            ))
        })?;
        Ok(ScanRecord {
            id: self.id,
            status,
            workplace: self.workplace,
            article: self.article,
            kind: self.kind,
            time: self.time,
            hydra_batch: self.hydra_batch,
            hydra_operators: decode_list("hydra_operators", Some(self.hydra_operators))?,
            pallet_batch: self.pallet_batch,
            pallet_time: self.pallet_time,
            pallet_operators: decode_list("pallet_operators", self.pallet_operators)?,
            rework_reason: self.rework_reason,
            rework_time: self.rework_time,
            rework_operators: decode_list("rework_operators", self.rework_operators)?,
        })
    }
}

/// Fields for a freshly scanned box. Status is always `pallet`.
#[derive(Debug, Clone)]
pub struct NewScan<'a> {
    pub workplace: &'a str,
    pub article: &'a str,
    pub kind: &'a str,
    pub time: &'a str,
    pub hydra_batch: &'a str,
    pub hydra_operators: &'a str,
}

/// Inserts a new box on the open pallet and returns its row id.
pub fn insert(conn: &Connection, scan: &NewScan<'_>) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO scans (status, workplace, article, type, time, hydra_batch, hydra_operators)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            BoxStatus::Pallet.as_str(),
            scan.workplace,
            scan.article,
            scan.kind,
            scan.time,
            scan.hydra_batch,
            scan.hydra_operators,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Whether any record, in any status, carries this hydra batch.
pub fn hydra_batch_exists(conn: &Connection, hydra_batch: &str) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM scans WHERE hydra_batch = ?1)",
        params![hydra_batch],
        |r| r.get(0),
    )?;
    Ok(exists)
}

/// Whether any record was closed under this pallet batch.
pub fn pallet_batch_exists(conn: &Connection, pallet_batch: &str) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM scans WHERE pallet_batch = ?1)",
        params![pallet_batch],
        |r| r.get(0),
    )?;
    Ok(exists)
}

/// Counts records of one (workplace, article) pair in the given status.
pub fn count_by_status(
    conn: &Connection,
    workplace: &str,
    article: &str,
    status: BoxStatus,
) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM scans WHERE workplace = ?1 AND article = ?2 AND status = ?3",
        params![workplace, article, status.as_str()],
        |r| r.get(0),
    )?;
    Ok(count)
}

/// Lists records of one (workplace, article) pair in the given status, newest first.
pub fn list_by_status(
    conn: &Connection,
    workplace: &str,
    article: &str,
    status: BoxStatus,
) -> Result<Vec<ScanRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM scans WHERE workplace = ?1 AND article = ?2 AND status = ?3
         ORDER BY time DESC, id DESC",
    )?;
    let rows = stmt
        .query_map(params![workplace, article, status.as_str()], ScanRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists all records closed under one pallet batch.
pub fn list_by_pallet_batch(
    conn: &Connection,
    pallet_batch: &str,
) -> Result<Vec<ScanRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM scans WHERE pallet_batch = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![pallet_batch], ScanRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Finds the record for a hydra batch, whatever its status.
pub fn find_by_hydra_batch(
    conn: &Connection,
    hydra_batch: &str,
) -> Result<Option<ScanRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM scans WHERE hydra_batch = ?1",
            params![hydra_batch],
            ScanRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Moves every open-pallet record of the pair to the warehouse.
///
/// Returns the number of records moved.
pub fn close_pallet(
    conn: &Connection,
    workplace: &str,
    article: &str,
    pallet_batch: &str,
    pallet_time: &str,
    pallet_operators: &str,
) -> Result<usize, DatabaseError> {
    let moved = conn.execute(
        "UPDATE scans SET status = ?1, pallet_batch = ?2, pallet_time = ?3, pallet_operators = ?4
         WHERE workplace = ?5 AND article = ?6 AND status = ?7",
        params![
            BoxStatus::Warehouse.as_str(),
            pallet_batch,
            pallet_time,
            pallet_operators,
            workplace,
            article,
            BoxStatus::Pallet.as_str(),
        ],
    )?;
    Ok(moved)
}

/// Flips one open-pallet record to rework. Returns the number of rows changed (0 or 1).
pub fn mark_rework(
    conn: &Connection,
    hydra_batch: &str,
    reason: &str,
    rework_time: &str,
    rework_operators: &str,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE scans SET status = ?1, rework_reason = ?2, rework_time = ?3, rework_operators = ?4
         WHERE hydra_batch = ?5 AND status = ?6",
        params![
            BoxStatus::Rework.as_str(),
            reason,
            rework_time,
            rework_operators,
            hydra_batch,
            BoxStatus::Pallet.as_str(),
        ],
    )?;
    Ok(changed)
}
