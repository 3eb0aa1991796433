//! Aggregate status derivation tests.

use settlement_service::models::{
    AnnexureStatus, FileGroup, FileGroupStatus, LineItem, LineItemStatus,
};
use settlement_service::services::aggregation::{
    all_groups_approved, all_items_approved, derive_annexure_status,
};
use uuid::Uuid;

use FileGroupStatus as G;

fn group(status: FileGroupStatus) -> FileGroup {
    FileGroup {
        group_id: Uuid::new_v4(),
        annexure_id: Uuid::new_v4(),
        file_number: "FILE-1".to_string(),
        status,
        rejection_reason: None,
    }
}

fn item(status: LineItemStatus) -> LineItem {
    LineItem {
        line_item_id: Uuid::new_v4(),
        lr_number: "LR-1".to_string(),
        file_number: "FILE-1".to_string(),
        status,
        offered_price: rust_decimal::Decimal::ZERO,
        settled_price: rust_decimal::Decimal::ZERO,
        extra_cost: rust_decimal::Decimal::ZERO,
        line_price: rust_decimal::Decimal::ZERO,
        pod_url: None,
        annexure_id: None,
        group_id: None,
        invoice_id: None,
        is_invoiced: false,
        rejection_reason: None,
    }
}

#[test]
fn any_rejection_dominates_regardless_of_other_statuses() {
    let combos: &[&[G]] = &[
        &[G::Rejected],
        &[G::Approved, G::Rejected],
        &[G::Rejected, G::Approved, G::Approved],
        &[G::Pending, G::UnderReview, G::Rejected],
        &[G::Rejected, G::Rejected],
    ];
    for children in combos {
        assert_eq!(
            derive_annexure_status(children),
            AnnexureStatus::HasRejections,
            "children={:?}",
            children
        );
    }
}

#[test]
fn all_approved_yields_partially_approved_not_pending_reviewer_2() {
    // Advancing to the second reviewer is an explicit human decision; the
    // derivation never does it.
    assert_eq!(
        derive_annexure_status(&[G::Approved, G::Approved, G::Approved]),
        AnnexureStatus::PartiallyApproved
    );
}

#[test]
fn mixed_progress_yields_partially_approved() {
    assert_eq!(
        derive_annexure_status(&[G::Approved, G::Pending]),
        AnnexureStatus::PartiallyApproved
    );
    assert_eq!(
        derive_annexure_status(&[G::UnderReview, G::Pending]),
        AnnexureStatus::PartiallyApproved
    );
}

#[test]
fn forward_gate_helpers_require_nonempty_fully_approved_sets() {
    assert!(!all_groups_approved(&[]));
    assert!(!all_items_approved(&[]));

    assert!(all_groups_approved(&[group(G::Approved), group(G::Approved)]));
    assert!(!all_groups_approved(&[group(G::Approved), group(G::Pending)]));

    assert!(all_items_approved(&[item(LineItemStatus::Approved)]));
    assert!(!all_items_approved(&[
        item(LineItemStatus::Approved),
        item(LineItemStatus::Verified),
    ]));
}
