//! Deletion guard rails and cascade behavior.

mod common;

use common::{reviewer1, submitter, TestApp, VENDOR_ID};
use rust_decimal::Decimal;
use settlement_core::error::AppError;
use settlement_service::models::{Actor, AnnexureStatus, InvoiceStatus, Role};
use settlement_service::repository::SettlementRepository;
use settlement_service::services::collaborators::workflow_comment;

#[tokio::test]
async fn delete_is_allowed_only_from_rework_eligible_statuses() {
    let deletable = [
        AnnexureStatus::Draft,
        AnnexureStatus::HasRejections,
        AnnexureStatus::RejectedByReviewer2,
    ];

    for status in AnnexureStatus::ALL {
        let app = TestApp::new();
        let seeded = app.seed_complete_annexure(status);
        let result = app.orchestrator.delete(seeded.annexure_id, &submitter()).await;
        if deletable.contains(&status) {
            assert!(result.is_ok(), "delete from {} should pass", status.as_str());
        } else {
            assert!(
                matches!(result, Err(AppError::PreconditionFailed { .. })),
                "delete from {} should be denied",
                status.as_str()
            );
        }
    }
}

#[tokio::test]
async fn delete_is_denied_for_reviewers_and_foreign_submitters() {
    let app = TestApp::new();
    let seeded = app.seed_complete_annexure(AnnexureStatus::Draft);

    let err = app
        .orchestrator
        .delete(seeded.annexure_id, &reviewer1())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Right role, wrong vendor.
    let other_vendor = Actor::new("globex-freight", Role::Submitter);
    let err = app
        .orchestrator
        .delete(seeded.annexure_id, &other_vendor)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let annexure = app
        .repo
        .get_annexure(seeded.annexure_id)
        .await
        .unwrap()
        .expect("annexure survives denied deletes");
    assert_eq!(annexure.vendor_id, VENDOR_ID);
}

#[tokio::test]
async fn delete_unlinks_line_items_and_removes_children() {
    let app = TestApp::new();
    let seeded = app.seed_complete_annexure(AnnexureStatus::Draft);
    let invoice_id = app.seed_invoice(seeded.annexure_id, InvoiceStatus::Draft);
    app.repo
        .create_comment(workflow_comment(
            "please recheck FILE-B".to_string(),
            "reviewer-one",
            Role::Reviewer1,
            Some(seeded.annexure_id),
            None,
            false,
        ))
        .await
        .unwrap();

    app.orchestrator
        .delete(seeded.annexure_id, &submitter())
        .await
        .unwrap();

    assert!(app
        .repo
        .get_annexure(seeded.annexure_id)
        .await
        .unwrap()
        .is_none());
    assert!(app
        .repo
        .annexure_snapshot(seeded.annexure_id)
        .await
        .unwrap()
        .is_none());

    // Line items survive deletion but carry no links or financials.
    let items = app.repo.all_line_items();
    assert_eq!(items.len(), seeded.items.len());
    for item in &items {
        assert!(item.annexure_id.is_none());
        assert!(item.group_id.is_none());
        assert!(item.invoice_id.is_none());
        assert!(!item.is_invoiced);
        assert_eq!(item.offered_price, Decimal::ZERO);
        assert_eq!(item.settled_price, Decimal::ZERO);
        assert_eq!(item.line_price, Decimal::ZERO);
    }

    // The invoice survives too, detached from the deleted annexure.
    let invoice = app.repo.get_invoice(invoice_id).await.unwrap().unwrap();
    assert!(invoice.annexure_id.is_none());

    let comments = app.repo.comments_for(seeded.annexure_id).await.unwrap();
    assert!(comments.is_empty());
}

#[tokio::test]
async fn failed_attachment_cleanup_surfaces_as_partial_failure() {
    let app = TestApp::with_failing_attachments();
    let seeded = app.seed_complete_annexure(AnnexureStatus::Draft);
    app.documents
        .put_extra_cost_document(seeded.annexure_id, "FILE-A");

    let err = app
        .orchestrator
        .delete(seeded.annexure_id, &submitter())
        .await
        .unwrap_err();
    let AppError::PartialFailure { committed, .. } = err else {
        panic!("expected PartialFailure");
    };
    assert!(committed.contains("annexure"));

    // The database side of the delete did commit.
    assert!(app
        .repo
        .get_annexure(seeded.annexure_id)
        .await
        .unwrap()
        .is_none());
}
