//! Invoice generation gating and computation tests.

mod common;

use common::{ItemSpec, TestApp};
use rust_decimal::Decimal;
use settlement_core::error::AppError;
use settlement_service::models::{AnnexureStatus, FileGroupStatus, InvoiceStatus};
use settlement_service::repository::SettlementRepository;
use settlement_service::services::invoice_generator::generate;

#[tokio::test]
async fn generation_fails_for_annexure_without_line_items() {
    let app = TestApp::new();
    let annexure_id = app.seed_annexure("AX-empty", AnnexureStatus::Draft);
    let snap = app
        .repo
        .annexure_snapshot(annexure_id)
        .await
        .unwrap()
        .unwrap();

    let err = generate(&snap.annexure, &snap.items, app.documents.as_ref())
        .await
        .unwrap_err();
    let AppError::ValidationFailed { violations, .. } = err else {
        panic!("expected ValidationFailed, got {:?}", err);
    };
    assert_eq!(violations.len(), 1);
    assert!(violations[0].contains("no line items"));
}

#[tokio::test]
async fn generation_lists_every_item_missing_a_pod() {
    let app = TestApp::new();
    let annexure_id = app.seed_annexure("AX-pods", AnnexureStatus::Draft);
    let group = app.seed_group(annexure_id, "FILE-A", FileGroupStatus::Pending);
    app.seed_item(ItemSpec::new(annexure_id, group, "FILE-A", "LR-010", Decimal::from(80)));
    app.seed_item(
        ItemSpec::new(annexure_id, group, "FILE-A", "LR-011", Decimal::from(90)).without_pod(),
    );
    app.seed_item(
        ItemSpec::new(annexure_id, group, "FILE-A", "LR-012", Decimal::from(70)).without_pod(),
    );

    let snap = app
        .repo
        .annexure_snapshot(annexure_id)
        .await
        .unwrap()
        .unwrap();
    let err = generate(&snap.annexure, &snap.items, app.documents.as_ref())
        .await
        .unwrap_err();

    let AppError::ValidationFailed { violations, .. } = err else {
        panic!("expected ValidationFailed, got {:?}", err);
    };
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().any(|v| v.contains("LR-011")));
    assert!(violations.iter().any(|v| v.contains("LR-012")));
    assert!(!violations.iter().any(|v| v.contains("LR-010")));
}

#[tokio::test]
async fn extra_cost_requires_a_supporting_document_per_file() {
    let app = TestApp::new();
    let annexure_id = app.seed_annexure("AX-extra", AnnexureStatus::Draft);
    let group = app.seed_group(annexure_id, "FILE-X", FileGroupStatus::Pending);
    app.seed_item(
        ItemSpec::new(annexure_id, group, "FILE-X", "LR-020", Decimal::from(120))
            .with_extra_cost(Decimal::from(15)),
    );

    let snap = app
        .repo
        .annexure_snapshot(annexure_id)
        .await
        .unwrap()
        .unwrap();

    let err = generate(&snap.annexure, &snap.items, app.documents.as_ref())
        .await
        .unwrap_err();
    let AppError::ValidationFailed { violations, .. } = err else {
        panic!("expected ValidationFailed, got {:?}", err);
    };
    assert_eq!(violations.len(), 1);
    assert!(violations[0].contains("FILE-X"));

    // With the document in place the same annexure generates cleanly.
    app.documents.put_extra_cost_document(annexure_id, "FILE-X");
    let plan = generate(&snap.annexure, &snap.items, app.documents.as_ref())
        .await
        .unwrap();
    assert_eq!(plan.invoice.subtotal, Decimal::from(120));
}

#[tokio::test]
async fn pod_and_extra_cost_violations_accumulate_in_one_report() {
    let app = TestApp::new();
    let annexure_id = app.seed_annexure("AX-both", AnnexureStatus::Draft);
    let group = app.seed_group(annexure_id, "FILE-Y", FileGroupStatus::Pending);
    app.seed_item(
        ItemSpec::new(annexure_id, group, "FILE-Y", "LR-030", Decimal::from(60))
            .without_pod()
            .with_extra_cost(Decimal::from(5)),
    );

    let snap = app
        .repo
        .annexure_snapshot(annexure_id)
        .await
        .unwrap()
        .unwrap();
    let err = generate(&snap.annexure, &snap.items, app.documents.as_ref())
        .await
        .unwrap_err();
    let AppError::ValidationFailed { violations, .. } = err else {
        panic!("expected ValidationFailed, got {:?}", err);
    };
    assert_eq!(violations.len(), 2);
}

#[tokio::test]
async fn complete_annexure_settles_per_file_totals() {
    let app = TestApp::new();
    let seeded = app.seed_complete_annexure(AnnexureStatus::Draft);
    let snap = app
        .repo
        .annexure_snapshot(seeded.annexure_id)
        .await
        .unwrap()
        .unwrap();

    let plan = generate(&snap.annexure, &snap.items, app.documents.as_ref())
        .await
        .unwrap();

    assert_eq!(plan.settlements.len(), 2);
    let file_a = plan
        .settlements
        .iter()
        .find(|s| s.file_number == "FILE-A")
        .unwrap();
    let file_b = plan
        .settlements
        .iter()
        .find(|s| s.file_number == "FILE-B")
        .unwrap();
    assert_eq!(file_a.settled_total, Decimal::from(450));
    assert_eq!(file_b.settled_total, Decimal::from(125));

    assert_eq!(plan.invoice.status, InvoiceStatus::Draft);
    assert_eq!(plan.invoice.subtotal, Decimal::from(575));
    assert_eq!(plan.invoice.grand_total, Decimal::from(575));
    assert_eq!(plan.invoice.annexure_id, Some(seeded.annexure_id));
}

#[tokio::test]
async fn reference_number_has_vendor_prefix_date_and_suffix() {
    let app = TestApp::new();
    let seeded = app.seed_complete_annexure(AnnexureStatus::Draft);
    let snap = app
        .repo
        .annexure_snapshot(seeded.annexure_id)
        .await
        .unwrap()
        .unwrap();

    let plan = generate(&snap.annexure, &snap.items, app.documents.as_ref())
        .await
        .unwrap();

    let parts: Vec<&str> = plan.invoice.reference_number.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "ACM"); // first three letters of "acme-logistics"
    assert_eq!(parts[1].len(), 8);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 3);
    assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
}
