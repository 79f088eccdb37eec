//! End-to-end scanning workflow: box scans, pallet labels, closing and rework.

mod common;

use std::thread;

use common::{article, batch_id, operators, BoxCode, ConfigBuilder, TestHarness};
use palletline::{BoxStatus, LabelOutcome, PalletCloseOutcome, ReworkStatus, ScanStatus};

const WP: &str = "eol136153";

fn label(h: &TestHarness, workplace: &str, article: &str) -> (String, String) {
    match h.station.pallet_label(workplace, article) {
        LabelOutcome::Ready {
            code, pallet_batch, ..
        } => (code, pallet_batch),
        other => panic!("expected a pallet label, got {:?}", other),
    }
}

#[test]
fn test_full_pallet_of_28067() {
    let h = TestHarness::new();
    h.scan_boxes(WP, &BoxCode::new("28067", 12), 1, 25);

    let state = h.station.pallet_state(WP, "28067").unwrap().unwrap();
    assert_eq!(state.box_count, 25);
    assert!(state.is_full);

    let extra = BoxCode::new("28067", 12).batch(&batch_id("HB", 26)).build();
    assert_eq!(
        h.station.save_hydra_batch(WP, &extra, &operators()),
        ScanStatus::FullPallet
    );

    let (code, pallet_batch) = label(&h, WP, "28067");
    match h.station.save_pallet_batch(WP, "28067", &code, &operators()) {
        PalletCloseOutcome::Success {
            pallet_batch: closed,
            moved,
            total_quantity,
        } => {
            assert_eq!(closed, pallet_batch);
            assert_eq!(moved, 25);
            assert_eq!(total_quantity, 300);
        }
        other => panic!("expected success, got {:?}", other),
    }

    // The pallet is empty again and accepts the rejected box.
    assert_eq!(
        h.station.save_hydra_batch(WP, &extra, &operators()),
        ScanStatus::Saved
    );
}

#[test]
fn test_second_scan_of_same_code_exists() {
    let h = TestHarness::new();
    let code = BoxCode::new("28042", 10).batch("X1Y2Z3W4V5").build();

    assert_eq!(h.station.save_hydra_batch(WP, &code, &operators()), ScanStatus::Saved);
    assert_eq!(h.station.save_hydra_batch(WP, &code, &operators()), ScanStatus::Exists);

    let record = h.station.find_box("x1y2z3w4v5").unwrap().unwrap();
    assert_eq!(record.status, BoxStatus::Pallet);
    assert_eq!(record.hydra_operators, operators());
    assert_eq!(record.kind, "153");
}

#[test]
fn test_rejected_scans_insert_nothing() {
    let h = TestHarness::new();
    let cases = [
        (BoxCode::new("28067", 11).build(), ScanStatus::WrongQuantity),
        (BoxCode::new("28067", 12).process("040").build(), ScanStatus::WrongProcess),
        (BoxCode::new("99999", 12).build(), ScanStatus::WrongArticle),
        ("A:28067|O:050|Q:12".to_string(), ScanStatus::Invalid),
        ("A:28067|O:050|Q:+12|B:PLUSSIGN01|C:F".to_string(), ScanStatus::Invalid),
    ];

    for (code, expected) in cases {
        assert_eq!(
            h.station.save_hydra_batch(WP, &code, &operators()),
            expected,
            "code {}",
            code
        );
    }
    assert!(h.station.pallet_boxes(WP, "28067").unwrap().is_empty());
}

#[test]
fn test_close_moves_only_open_pallet_boxes() {
    let config = ConfigBuilder::new()
        .article("eol1", article("10001", 4, 5))
        .article("eol1", article("10002", 4, 5))
        .build();
    let h = TestHarness::with_config(config);

    h.scan_boxes("eol1", &BoxCode::new("10001", 5), 1, 3);
    h.scan_boxes("eol1", &BoxCode::new("10002", 5), 10, 2);
    assert_eq!(
        h.station.rework_hydra_batch(&batch_id("HB", 2), "dented", &operators()),
        ReworkStatus::Reworked
    );

    let (code, pallet_batch) = label(&h, "eol1", "10001");
    assert!(code.contains("|Q:10|"));
    assert!(matches!(
        h.station.save_pallet_batch("eol1", "10001", &code, &operators()),
        PalletCloseOutcome::Success { moved: 2, .. }
    ));

    let contents = h.station.pallet_contents(&pallet_batch).unwrap();
    assert_eq!(contents.len(), 2);
    assert!(contents.iter().all(|r| r.status == BoxStatus::Warehouse
        && r.pallet_batch.as_deref() == Some(pallet_batch.as_str())
        && r.pallet_operators == operators()));

    let reworked = h.station.find_box(&batch_id("HB", 2)).unwrap().unwrap();
    assert_eq!(reworked.status, BoxStatus::Rework);
    assert!(reworked.pallet_batch.is_none());

    // The other article's pallet is untouched.
    assert_eq!(h.station.pallet_boxes("eol1", "10002").unwrap().len(), 2);
}

#[test]
fn test_label_printed_before_last_box_cannot_close() {
    let h = TestHarness::new();
    h.scan_boxes(WP, &BoxCode::new("28042", 10), 1, 3);
    let (stale, _) = label(&h, WP, "28042");
    assert!(stale.contains("|Q:30|"));

    h.scan_boxes(WP, &BoxCode::new("28042", 10), 4, 1);
    assert_eq!(
        h.station.save_pallet_batch(WP, "28042", &stale, &operators()),
        PalletCloseOutcome::WrongQuantity {
            labelled: 30,
            on_pallet: 40,
        }
    );
    assert_eq!(h.station.pallet_boxes(WP, "28042").unwrap().len(), 4);

    let (fresh, pallet_batch) = label(&h, WP, "28042");
    assert!(matches!(
        h.station.save_pallet_batch(WP, "28042", &fresh, &operators()),
        PalletCloseOutcome::Success { moved: 4, total_quantity: 40, .. }
    ));
    assert_eq!(h.station.pallet_contents(&pallet_batch).unwrap().len(), 4);
}

#[test]
fn test_rework_of_warehouse_box_is_not_found() {
    let h = TestHarness::new();
    h.scan_boxes(WP, &BoxCode::new("28042", 10), 1, 1);
    let (code, _) = label(&h, WP, "28042");
    h.station.save_pallet_batch(WP, "28042", &code, &operators());

    assert_eq!(
        h.station.rework_hydra_batch(&batch_id("HB", 1), "scratch", &operators()),
        ReworkStatus::NotFound
    );
    let record = h.station.find_box(&batch_id("HB", 1)).unwrap().unwrap();
    assert_eq!(record.status, BoxStatus::Warehouse);
    assert!(record.rework_reason.is_none());
}

#[test]
fn test_concurrent_scans_respect_pallet_size() {
    let config = ConfigBuilder::new()
        .article("eol1", article("10001", 3, 5))
        .build();
    let h = TestHarness::with_config(config);

    let statuses: Vec<ScanStatus> = thread::scope(|scope| {
        let handles: Vec<_> = (0..12)
            .map(|n| {
                let station = h.station.clone();
                scope.spawn(move || {
                    let code = BoxCode::new("10001", 5).batch(&batch_id("CC", n)).build();
                    station.save_hydra_batch("eol1", &code, &operators())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let saved = statuses.iter().filter(|s| **s == ScanStatus::Saved).count();
    let full = statuses.iter().filter(|s| **s == ScanStatus::FullPallet).count();
    assert_eq!(saved, 3);
    assert_eq!(full, 9);
    assert_eq!(h.station.pallet_state("eol1", "10001").unwrap().unwrap().box_count, 3);
}

#[test]
fn test_concurrent_duplicate_scans_save_once() {
    let h = TestHarness::new();
    let code = BoxCode::new("28067", 12).batch("DUPLICATE1").build();

    let statuses: Vec<ScanStatus> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let station = h.station.clone();
                let code = code.clone();
                scope.spawn(move || station.save_hydra_batch(WP, &code, &operators()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(statuses.iter().filter(|s| **s == ScanStatus::Saved).count(), 1);
    assert!(statuses
        .iter()
        .all(|s| matches!(s, ScanStatus::Saved | ScanStatus::Exists)));
}

#[test]
fn test_outcomes_serialize_with_status_tag() {
    let h = TestHarness::new();
    let code = BoxCode::new("28067", 7).build();
    let status = h.station.save_hydra_batch(WP, &code, &operators());
    assert_eq!(
        serde_json::to_value(status).unwrap(),
        serde_json::json!({ "status": "wrong quantity" })
    );

    let empty = h.station.pallet_label(WP, "28067");
    assert_eq!(
        serde_json::to_value(empty).unwrap(),
        serde_json::json!({ "status": "empty pallet" })
    );
}
