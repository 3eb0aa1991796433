//! Static transition tables for the annexure and invoice state graphs.
//!
//! Two tables per entity type: `*_targets` answers "what sequencing is
//! legal from here", `*_roles` answers "who may land on that status". A
//! transition is legal iff both tables admit it. Anything not listed is
//! denied.

use crate::models::{AnnexureStatus, InvoiceStatus, Role};

use AnnexureStatus as A;
use InvoiceStatus as I;
use Role as R;

/// Statuses reachable from `current` on the annexure graph.
pub fn annexure_targets(current: AnnexureStatus) -> &'static [AnnexureStatus] {
    match current {
        A::Draft => &[A::PendingReviewer1],
        A::PendingReviewer1 => &[A::PartiallyApproved, A::HasRejections, A::PendingReviewer2],
        // Self-loops let the first reviewer keep working a batch that is
        // already partially reviewed.
        A::PartiallyApproved => &[A::PartiallyApproved, A::HasRejections, A::PendingReviewer2],
        A::HasRejections => &[A::Draft, A::HasRejections],
        A::PendingReviewer2 => &[A::RejectedByReviewer2, A::Approved],
        A::RejectedByReviewer2 => &[A::Draft],
        A::Approved => &[],
    }
}

/// Roles authorized to move an annexure INTO `target`.
pub fn annexure_roles(target: AnnexureStatus) -> &'static [Role] {
    match target {
        A::Draft => &[R::Submitter],
        A::PendingReviewer1 => &[R::Submitter],
        A::PartiallyApproved | A::HasRejections | A::PendingReviewer2 => &[R::Reviewer1],
        A::RejectedByReviewer2 | A::Approved => &[R::Reviewer2],
    }
}

pub fn can_transition_annexure(
    role: Role,
    current: AnnexureStatus,
    target: AnnexureStatus,
) -> bool {
    annexure_targets(current).contains(&target) && annexure_roles(target).contains(&role)
}

/// Statuses reachable from `current` on the invoice graph.
pub fn invoice_targets(current: InvoiceStatus) -> &'static [InvoiceStatus] {
    match current {
        I::Draft => &[I::PendingReviewer1],
        I::PendingReviewer1 => &[I::RejectedByReviewer1, I::PendingReviewer2],
        I::RejectedByReviewer1 => &[I::Draft],
        I::PendingReviewer2 => &[I::RejectedByReviewer2, I::Approved],
        I::RejectedByReviewer2 => &[I::Draft],
        I::Approved => &[I::PaymentApproved],
        I::PaymentApproved => &[],
    }
}

/// Roles authorized to move an invoice INTO `target`.
pub fn invoice_roles(target: InvoiceStatus) -> &'static [Role] {
    match target {
        I::Draft => &[R::Submitter],
        I::PendingReviewer1 => &[R::Submitter],
        I::RejectedByReviewer1 | I::PendingReviewer2 => &[R::Reviewer1],
        I::RejectedByReviewer2 | I::Approved | I::PaymentApproved => &[R::Reviewer2],
    }
}

pub fn can_transition_invoice(role: Role, current: InvoiceStatus, target: InvoiceStatus) -> bool {
    invoice_targets(current).contains(&target) && invoice_roles(target).contains(&role)
}
