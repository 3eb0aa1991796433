//! Aggregate status derivation for an annexure from its file groups.

use crate::models::{AnnexureStatus, FileGroup, FileGroupStatus, LineItem, LineItemStatus};

/// Derive the annexure status from the committed statuses of its file
/// groups. Precedence: any rejection dominates; everything else is the
/// mixed-progress `PartiallyApproved` state. An all-approved annexure is
/// deliberately NOT advanced to `PendingReviewer2` here; handing off to the
/// second reviewer is an explicit human decision, not a derivation.
pub fn derive_annexure_status(children: &[FileGroupStatus]) -> AnnexureStatus {
    if children.iter().any(|s| *s == FileGroupStatus::Rejected) {
        return AnnexureStatus::HasRejections;
    }
    AnnexureStatus::PartiallyApproved
}

/// First half of the forward guard: every file group approved.
pub fn all_groups_approved(groups: &[FileGroup]) -> bool {
    !groups.is_empty()
        && groups
            .iter()
            .all(|g| g.status == FileGroupStatus::Approved)
}

/// Second half of the forward guard, checked independently of the group
/// statuses: every line item approved.
pub fn all_items_approved(items: &[LineItem]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|i| i.status == LineItemStatus::Approved)
}

/// Line items blocking the forward operation, for the precondition report.
pub fn unapproved_items(items: &[LineItem]) -> Vec<&LineItem> {
    items
        .iter()
        .filter(|i| i.status != LineItemStatus::Approved)
        .collect()
}
