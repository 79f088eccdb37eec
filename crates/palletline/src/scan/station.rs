//! Box scanning, pallet accumulation and pallet close.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn};

use super::batch_id;
use super::code::{self, QrCode};
use super::error::Result;
use super::outcome::{LabelOutcome, PalletCloseOutcome, PalletState, ReworkStatus, ScanStatus};
use super::record::{BoxStatus, ScanRecord};
use crate::config::{ArticleCatalog, ArticleSpec};
use crate::db::scan_repo::{self, NewScan};
use crate::db::{encode_list, now_rfc3339, Database};
use crate::sanitize::{normalize_operators, redact_operators};

/// Entry point for the end-of-line scanning workflow.
///
/// Stateless apart from its handles: any number of stations may share one
/// [`Database`]. Capacity and uniqueness checks run in the same
/// transaction as the write they guard.
#[derive(Clone)]
pub struct ScanStation {
    db: Database,
    catalog: Arc<ArticleCatalog>,
}

impl ScanStation {
    pub fn new(db: Database, catalog: Arc<ArticleCatalog>) -> Self {
        Self { db, catalog }
    }

    pub fn catalog(&self) -> &ArticleCatalog {
        &self.catalog
    }

    /// Records a scanned box label on the open pallet of its article.
    pub fn save_hydra_batch(
        &self,
        workplace: &str,
        raw_code: &str,
        operators: &[String],
    ) -> ScanStatus {
        let span = info_span!(
            "save_hydra_batch",
            workplace = %workplace,
            article = tracing::field::Empty,
            operators = %redact_operators(operators),
        );
        let _enter = span.enter();

        match self.try_save_hydra_batch(workplace, raw_code, operators) {
            Ok(ScanStatus::Saved) => {
                info!("Box saved to pallet");
                ScanStatus::Saved
            }
            Ok(status) => {
                warn!(status = %status, "Box scan rejected");
                status
            }
            Err(e) => {
                error!(error = %e, "Box scan failed");
                ScanStatus::Error
            }
        }
    }

    fn try_save_hydra_batch(
        &self,
        workplace: &str,
        raw_code: &str,
        operators: &[String],
    ) -> Result<ScanStatus> {
        let operators = normalize_operators(operators);
        if operators.is_empty() {
            return Ok(ScanStatus::Invalid);
        }

        let code = match code::parse(raw_code) {
            Ok(code) => code,
            Err(reason) => {
                debug!(reason = %reason, "Unparseable box label");
                return Ok(ScanStatus::Invalid);
            }
        };

        let Some(spec) = self.catalog.get(workplace, &code.article) else {
            return Ok(ScanStatus::WrongArticle);
        };
        if code.quantity != spec.box_size {
            return Ok(ScanStatus::WrongQuantity);
        }
        if code.process != spec.hydra_process {
            return Ok(ScanStatus::WrongProcess);
        }
        if !code.has_batch() {
            return Ok(ScanStatus::Invalid);
        }

        tracing::Span::current().record("article", code.article.as_str());
        let operators_json = encode_list("hydra_operators", &operators)?;
        let time = now_rfc3339();

        let status = self.db.with_transaction(|conn| {
            if scan_repo::hydra_batch_exists(conn, &code.batch)? {
                return Ok(ScanStatus::Exists);
            }

            let on_pallet =
                scan_repo::count_by_status(conn, workplace, &spec.article, BoxStatus::Pallet)?;
            if on_pallet >= spec.pallet_size {
                return Ok(ScanStatus::FullPallet);
            }

            let scan = NewScan {
                workplace,
                article: &spec.article,
                kind: &spec.kind,
                time: &time,
                hydra_batch: &code.batch,
                hydra_operators: &operators_json,
            };
            match scan_repo::insert(conn, &scan) {
                Ok(_) => Ok(ScanStatus::Saved),
                Err(e) if e.is_unique_violation() => Ok(ScanStatus::Exists),
                Err(e) => Err(e),
            }
        })?;

        Ok(status)
    }

    /// Fill level of the open pallet, or `None` for an unconfigured article.
    pub fn pallet_state(&self, workplace: &str, article: &str) -> Result<Option<PalletState>> {
        let Some(spec) = self.catalog.get(workplace, article) else {
            return Ok(None);
        };
        let box_count = self.db.with_conn(|conn| {
            scan_repo::count_by_status(conn, workplace, article, BoxStatus::Pallet)
        })?;
        Ok(Some(pallet_state(spec, box_count)))
    }

    /// Boxes on the open pallet, newest first.
    pub fn pallet_boxes(&self, workplace: &str, article: &str) -> Result<Vec<ScanRecord>> {
        let rows = self.db.with_conn(|conn| {
            scan_repo::list_by_status(conn, workplace, article, BoxStatus::Pallet)
        })?;
        let records = rows
            .into_iter()
            .map(|row| row.into_record())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Looks up one box by its hydra batch, whatever its status.
    pub fn find_box(&self, hydra_batch: &str) -> Result<Option<ScanRecord>> {
        let batch = hydra_batch.trim().to_ascii_uppercase();
        let row = self
            .db
            .with_conn(|conn| scan_repo::find_by_hydra_batch(conn, &batch))?;
        Ok(row.map(|r| r.into_record()).transpose()?)
    }

    /// Boxes that were closed together under one pallet batch.
    pub fn pallet_contents(&self, pallet_batch: &str) -> Result<Vec<ScanRecord>> {
        let batch = pallet_batch.trim().to_ascii_uppercase();
        let rows = self
            .db
            .with_conn(|conn| scan_repo::list_by_pallet_batch(conn, &batch))?;
        let records = rows
            .into_iter()
            .map(|row| row.into_record())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Mints a pallet label for the current contents of the open pallet.
    pub fn pallet_label(&self, workplace: &str, article: &str) -> LabelOutcome {
        let span = info_span!("pallet_label", workplace = %workplace, article = %article);
        let _enter = span.enter();

        match self.try_pallet_label(workplace, article) {
            Ok(outcome) => {
                if let LabelOutcome::Ready { pallet_batch, .. } = &outcome {
                    info!(pallet_batch = %pallet_batch, "Pallet label minted");
                }
                outcome
            }
            Err(e) => {
                error!(error = %e, "Pallet label failed");
                LabelOutcome::Error
            }
        }
    }

    fn try_pallet_label(&self, workplace: &str, article: &str) -> Result<LabelOutcome> {
        let Some(spec) = self.catalog.get(workplace, article) else {
            return Ok(LabelOutcome::WrongArticle);
        };

        let box_count = self.db.with_conn(|conn| {
            scan_repo::count_by_status(conn, workplace, article, BoxStatus::Pallet)
        })?;
        if box_count == 0 {
            return Ok(LabelOutcome::EmptyPallet);
        }

        let pallet_batch = batch_id::mint_unique(|candidate| {
            Ok(self
                .db
                .with_conn(|conn| scan_repo::pallet_batch_exists(conn, candidate))?)
        })?;

        let state = pallet_state(spec, box_count);
        let code = QrCode::pallet(
            &spec.article,
            &spec.pallet_process,
            state.total_quantity,
            &pallet_batch,
        );

        Ok(LabelOutcome::Ready {
            code: code.to_string(),
            pallet_batch,
            box_count,
            total_quantity: state.total_quantity,
            is_full: state.is_full,
        })
    }

    /// Closes the open pallet by scanning its label: every box on it moves
    /// to the warehouse under the label's batch id.
    pub fn save_pallet_batch(
        &self,
        workplace: &str,
        article: &str,
        raw_code: &str,
        operators: &[String],
    ) -> PalletCloseOutcome {
        let span = info_span!(
            "save_pallet_batch",
            workplace = %workplace,
            article = %article,
            operators = %redact_operators(operators),
        );
        let _enter = span.enter();

        match self.try_save_pallet_batch(workplace, article, raw_code, operators) {
            Ok(outcome) => {
                match &outcome {
                    PalletCloseOutcome::Success {
                        pallet_batch,
                        moved,
                        ..
                    } => info!(pallet_batch = %pallet_batch, moved, "Pallet closed"),
                    rejected => warn!(outcome = ?rejected, "Pallet close rejected"),
                }
                outcome
            }
            Err(e) => {
                error!(error = %e, "Pallet close failed");
                PalletCloseOutcome::Error
            }
        }
    }

    fn try_save_pallet_batch(
        &self,
        workplace: &str,
        article: &str,
        raw_code: &str,
        operators: &[String],
    ) -> Result<PalletCloseOutcome> {
        let operators = normalize_operators(operators);
        if operators.is_empty() {
            return Ok(PalletCloseOutcome::Invalid);
        }

        let code = match code::parse(raw_code) {
            Ok(code) => code,
            Err(reason) => {
                debug!(reason = %reason, "Unparseable pallet label");
                return Ok(PalletCloseOutcome::Invalid);
            }
        };

        let Some(spec) = self.catalog.get(workplace, article) else {
            return Ok(PalletCloseOutcome::WrongArticle);
        };
        if code.article != spec.article {
            return Ok(PalletCloseOutcome::WrongArticle);
        }
        if !batch_id::is_pallet_batch_id(&code.batch) {
            return Ok(PalletCloseOutcome::Invalid);
        }
        if code.process != spec.pallet_process {
            return Ok(PalletCloseOutcome::WrongProcess);
        }

        let operators_json = encode_list("pallet_operators", &operators)?;
        let time = now_rfc3339();

        let outcome = self.db.with_transaction(|conn| {
            if scan_repo::pallet_batch_exists(conn, &code.batch)? {
                return Ok(PalletCloseOutcome::Exists);
            }

            let on_pallet =
                scan_repo::count_by_status(conn, workplace, &spec.article, BoxStatus::Pallet)?;
            if on_pallet == 0 {
                return Ok(PalletCloseOutcome::NotSaved);
            }
            if code.quantity != spec.total_quantity(on_pallet) {
                return Ok(PalletCloseOutcome::WrongQuantity {
                    labelled: code.quantity,
                    on_pallet: spec.total_quantity(on_pallet),
                });
            }

            let moved = scan_repo::close_pallet(
                conn,
                workplace,
                &spec.article,
                &code.batch,
                &time,
                &operators_json,
            )?;
            let moved = u32::try_from(moved).unwrap_or(u32::MAX);
            Ok(PalletCloseOutcome::Success {
                pallet_batch: code.batch.clone(),
                moved,
                total_quantity: spec.total_quantity(moved),
            })
        })?;

        Ok(outcome)
    }

    /// Pulls one box off its open pallet for rework.
    ///
    /// Only boxes still on a pallet qualify; a second call, or a call for a
    /// box already in the warehouse, reports `NotFound` and changes nothing.
    pub fn rework_hydra_batch(
        &self,
        hydra_batch: &str,
        reason: &str,
        operators: &[String],
    ) -> ReworkStatus {
        let span = info_span!(
            "rework_hydra_batch",
            batch = %hydra_batch.trim(),
            operators = %redact_operators(operators),
        );
        let _enter = span.enter();

        match self.try_rework_hydra_batch(hydra_batch, reason, operators) {
            Ok(ReworkStatus::Reworked) => {
                info!("Box moved to rework");
                ReworkStatus::Reworked
            }
            Ok(status) => {
                warn!(status = ?status, "Rework rejected");
                status
            }
            Err(e) => {
                error!(error = %e, "Rework failed");
                ReworkStatus::Error
            }
        }
    }

    fn try_rework_hydra_batch(
        &self,
        hydra_batch: &str,
        reason: &str,
        operators: &[String],
    ) -> Result<ReworkStatus> {
        let operators = normalize_operators(operators);
        let batch = hydra_batch.trim().to_ascii_uppercase();
        let reason = reason.trim();
        if operators.is_empty() || batch.is_empty() || reason.is_empty() {
            return Ok(ReworkStatus::Invalid);
        }

        let operators_json = encode_list("rework_operators", &operators)?;
        let time = now_rfc3339();
        let changed = self.db.with_conn(|conn| {
            scan_repo::mark_rework(conn, &batch, reason, &time, &operators_json)
        })?;

        Ok(if changed == 0 {
            ReworkStatus::NotFound
        } else {
            ReworkStatus::Reworked
        })
    }
}

fn pallet_state(spec: &ArticleSpec, box_count: u32) -> PalletState {
    PalletState {
        workplace: spec.workplace.clone(),
        article: spec.article.clone(),
        box_count,
        pallet_size: spec.pallet_size,
        box_size: spec.box_size,
        total_quantity: spec.total_quantity(box_count),
        is_full: box_count >= spec.pallet_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    const CONFIG: &str = r#"
    {
        "version": "1.0",
        "workplaces": [{
            "id": "eol1",
            "articles": [
                {
                    "article": "28067", "name": "M-136-K-1-A", "type": "136",
                    "pallet_size": 3, "box_size": 12,
                    "hydra_process": "050", "pallet_process": "059"
                },
                {
                    "article": "28042", "name": "M-153-K-C", "type": "153",
                    "pallet_size": 2, "box_size": 10,
                    "hydra_process": "050", "pallet_process": "059"
                }
            ]
        }]
    }
    "#;

    fn station() -> ScanStation {
        let config = load_config_from_str(CONFIG).unwrap();
        let catalog = Arc::new(ArticleCatalog::from_config(&config));
        ScanStation::new(Database::open_in_memory().unwrap(), catalog)
    }

    fn ops() -> Vec<String> {
        vec!["1234".to_string()]
    }

    fn box_code(article: &str, qty: u32, batch: &str) -> String {
        format!("A:{}|O:050|Q:{}|B:{}|C:F", article, qty, batch)
    }

    #[test]
    fn test_save_then_exists() {
        let s = station();
        let code = box_code("28067", 12, "AA00000001");
        assert_eq!(s.save_hydra_batch("eol1", &code, &ops()), ScanStatus::Saved);
        assert_eq!(s.save_hydra_batch("eol1", &code, &ops()), ScanStatus::Exists);
    }

    #[test]
    fn test_batch_is_case_insensitive() {
        let s = station();
        let lower = box_code("28067", 12, "aa00000001");
        let upper = box_code("28067", 12, "AA00000001");
        assert_eq!(s.save_hydra_batch("eol1", &lower, &ops()), ScanStatus::Saved);
        assert_eq!(s.save_hydra_batch("eol1", &upper, &ops()), ScanStatus::Exists);
    }

    #[test]
    fn test_validation_order() {
        let s = station();
        assert_eq!(
            s.save_hydra_batch("eol1", "garbage", &ops()),
            ScanStatus::Invalid
        );
        assert_eq!(
            s.save_hydra_batch("eol1", &box_code("99999", 12, "AA00000001"), &ops()),
            ScanStatus::WrongArticle
        );
        assert_eq!(
            s.save_hydra_batch("eol2", &box_code("28067", 12, "AA00000001"), &ops()),
            ScanStatus::WrongArticle
        );
        // Wrong quantity wins over wrong process.
        assert_eq!(
            s.save_hydra_batch("eol1", "A:28067|O:040|Q:6|B:AA00000001|C:F", &ops()),
            ScanStatus::WrongQuantity
        );
        assert_eq!(
            s.save_hydra_batch("eol1", "A:28067|O:040|Q:12|B:AA00000001|C:F", &ops()),
            ScanStatus::WrongProcess
        );
        assert_eq!(
            s.save_hydra_batch("eol1", "A:28067|O:050|Q:12|B:|C:FFFFFFFFFFF", &ops()),
            ScanStatus::Invalid
        );
        assert_eq!(s.pallet_state("eol1", "28067").unwrap().unwrap().box_count, 0);
    }

    #[test]
    fn test_operators_required() {
        let s = station();
        let code = box_code("28067", 12, "AA00000001");
        assert_eq!(s.save_hydra_batch("eol1", &code, &[]), ScanStatus::Invalid);
        assert_eq!(
            s.save_hydra_batch("eol1", &code, &["  ".to_string()]),
            ScanStatus::Invalid
        );
    }

    #[test]
    fn test_full_pallet() {
        let s = station();
        for i in 0..3 {
            let code = box_code("28067", 12, &format!("BB0000000{}", i));
            assert_eq!(s.save_hydra_batch("eol1", &code, &ops()), ScanStatus::Saved);
        }
        let state = s.pallet_state("eol1", "28067").unwrap().unwrap();
        assert!(state.is_full);
        assert_eq!(state.total_quantity, 36);

        let fourth = box_code("28067", 12, "BB00000009");
        assert_eq!(s.save_hydra_batch("eol1", &fourth, &ops()), ScanStatus::FullPallet);
        assert!(s.find_box("BB00000009").unwrap().is_none());

        // Another article at the same workplace has its own pallet.
        let other = box_code("28042", 10, "CC00000001");
        assert_eq!(s.save_hydra_batch("eol1", &other, &ops()), ScanStatus::Saved);
    }

    #[test]
    fn test_label_and_close() {
        let s = station();
        assert_eq!(s.pallet_label("eol1", "28067"), LabelOutcome::EmptyPallet);
        assert_eq!(s.pallet_label("eol1", "nope"), LabelOutcome::WrongArticle);

        for i in 0..2 {
            let code = box_code("28067", 12, &format!("DD0000000{}", i));
            s.save_hydra_batch("eol1", &code, &ops());
        }

        let LabelOutcome::Ready {
            code,
            pallet_batch,
            box_count,
            total_quantity,
            is_full,
        } = s.pallet_label("eol1", "28067")
        else {
            panic!("expected a label");
        };
        assert_eq!(box_count, 2);
        assert_eq!(total_quantity, 24);
        assert!(!is_full);
        assert_eq!(code, format!("A:28067|O:059|Q:24|B:{}|C:G", pallet_batch));

        let outcome = s.save_pallet_batch("eol1", "28067", &code, &ops());
        assert_eq!(
            outcome,
            PalletCloseOutcome::Success {
                pallet_batch: pallet_batch.clone(),
                moved: 2,
                total_quantity: 24,
            }
        );
        assert_eq!(s.pallet_contents(&pallet_batch).unwrap().len(), 2);
        assert_eq!(s.pallet_state("eol1", "28067").unwrap().unwrap().box_count, 0);

        // The same label cannot close a second pallet.
        s.save_hydra_batch("eol1", &box_code("28067", 12, "DD00000009"), &ops());
        assert_eq!(
            s.save_pallet_batch("eol1", "28067", &code, &ops()),
            PalletCloseOutcome::Exists
        );
    }

    #[test]
    fn test_stale_label_is_rejected() {
        let s = station();
        s.save_hydra_batch("eol1", &box_code("28067", 12, "SS00000001"), &ops());
        s.save_hydra_batch("eol1", &box_code("28067", 12, "SS00000002"), &ops());
        let LabelOutcome::Ready { code, .. } = s.pallet_label("eol1", "28067") else {
            panic!("expected a label");
        };

        s.save_hydra_batch("eol1", &box_code("28067", 12, "SS00000003"), &ops());
        assert_eq!(
            s.save_pallet_batch("eol1", "28067", &code, &ops()),
            PalletCloseOutcome::WrongQuantity {
                labelled: 24,
                on_pallet: 36,
            }
        );
        assert_eq!(s.pallet_state("eol1", "28067").unwrap().unwrap().box_count, 3);

        let wrong_process = code.replace("|O:059|", "|O:050|");
        assert_eq!(
            s.save_pallet_batch("eol1", "28067", &wrong_process, &ops()),
            PalletCloseOutcome::WrongProcess
        );
    }

    #[test]
    fn test_close_rejections() {
        let s = station();
        let label = "A:28067|O:059|Q:24|B:PP00000001|C:G";
        assert_eq!(
            s.save_pallet_batch("eol1", "28067", label, &ops()),
            PalletCloseOutcome::NotSaved
        );
        assert_eq!(
            s.save_pallet_batch("eol1", "28042", label, &ops()),
            PalletCloseOutcome::WrongArticle
        );
        assert_eq!(
            s.save_pallet_batch("eol1", "28067", "A:28067|O:059|Q:24|B:PP0001|C:GGGGGG", &ops()),
            PalletCloseOutcome::Invalid
        );
        assert_eq!(
            s.save_pallet_batch("eol1", "28067", "short", &ops()),
            PalletCloseOutcome::Invalid
        );
        assert_eq!(
            s.save_pallet_batch("eol1", "28067", label, &[]),
            PalletCloseOutcome::Invalid
        );
    }

    #[test]
    fn test_rework_once() {
        let s = station();
        s.save_hydra_batch("eol1", &box_code("28067", 12, "EE00000001"), &ops());

        assert_eq!(
            s.rework_hydra_batch("ee00000001", "scratched", &ops()),
            ReworkStatus::Reworked
        );
        assert_eq!(
            s.rework_hydra_batch("EE00000001", "scratched", &ops()),
            ReworkStatus::NotFound
        );
        assert_eq!(
            s.rework_hydra_batch("EE00000001", " ", &ops()),
            ReworkStatus::Invalid
        );

        let record = s.find_box("EE00000001").unwrap().unwrap();
        assert_eq!(record.status, BoxStatus::Rework);
        assert_eq!(record.rework_reason.as_deref(), Some("scratched"));
        assert_eq!(s.pallet_state("eol1", "28067").unwrap().unwrap().box_count, 0);
    }

    #[test]
    fn test_pallet_state_unknown_article() {
        let s = station();
        assert!(s.pallet_state("eol1", "00000").unwrap().is_none());
    }
}
