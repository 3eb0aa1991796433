//! Transition table tests: everything not explicitly whitelisted is denied.

use settlement_service::models::{AnnexureStatus, InvoiceStatus, Role};
use settlement_service::services::transition::{
    annexure_roles, annexure_targets, can_transition_annexure, can_transition_invoice,
    invoice_targets,
};

use AnnexureStatus as A;
use InvoiceStatus as I;
use Role as R;

/// The full legal set for annexures, written out by hand so a table edit
/// in the production code has to be mirrored deliberately here.
fn annexure_whitelist() -> Vec<(R, A, A)> {
    vec![
        (R::Submitter, A::Draft, A::PendingReviewer1),
        (R::Reviewer1, A::PendingReviewer1, A::PartiallyApproved),
        (R::Reviewer1, A::PendingReviewer1, A::HasRejections),
        (R::Reviewer1, A::PendingReviewer1, A::PendingReviewer2),
        (R::Reviewer1, A::PartiallyApproved, A::PartiallyApproved),
        (R::Reviewer1, A::PartiallyApproved, A::HasRejections),
        (R::Reviewer1, A::PartiallyApproved, A::PendingReviewer2),
        (R::Submitter, A::HasRejections, A::Draft),
        (R::Reviewer1, A::HasRejections, A::HasRejections),
        (R::Reviewer2, A::PendingReviewer2, A::RejectedByReviewer2),
        (R::Reviewer2, A::PendingReviewer2, A::Approved),
        (R::Submitter, A::RejectedByReviewer2, A::Draft),
    ]
}

#[test]
fn every_non_whitelisted_annexure_transition_is_denied() {
    let whitelist = annexure_whitelist();
    for role in R::ALL {
        for current in A::ALL {
            for target in A::ALL {
                let expected = whitelist.contains(&(role, current, target));
                assert_eq!(
                    can_transition_annexure(role, current, target),
                    expected,
                    "role={:?} current={:?} target={:?}",
                    role,
                    current,
                    target
                );
            }
        }
    }
}

#[test]
fn annexure_whitelist_is_fully_allowed() {
    for (role, current, target) in annexure_whitelist() {
        assert!(can_transition_annexure(role, current, target));
    }
}

#[test]
fn approved_annexure_is_terminal() {
    assert!(annexure_targets(A::Approved).is_empty());
}

#[test]
fn returning_to_draft_is_submitter_only_and_from_rejected_states_only() {
    assert_eq!(annexure_roles(A::Draft), &[R::Submitter]);
    for current in A::ALL {
        let can_reach_draft = annexure_targets(current).contains(&A::Draft);
        let is_rejected_state = matches!(current, A::HasRejections | A::RejectedByReviewer2);
        assert_eq!(can_reach_draft, is_rejected_state, "current={:?}", current);
    }
}

#[test]
fn reviewer_roles_never_overlap_on_annexure_targets() {
    for target in A::ALL {
        let roles = annexure_roles(target);
        assert_eq!(roles.len(), 1, "each target is owned by exactly one role");
    }
}

fn invoice_whitelist() -> Vec<(R, I, I)> {
    vec![
        (R::Submitter, I::Draft, I::PendingReviewer1),
        (R::Reviewer1, I::PendingReviewer1, I::RejectedByReviewer1),
        (R::Reviewer1, I::PendingReviewer1, I::PendingReviewer2),
        (R::Submitter, I::RejectedByReviewer1, I::Draft),
        (R::Reviewer2, I::PendingReviewer2, I::RejectedByReviewer2),
        (R::Reviewer2, I::PendingReviewer2, I::Approved),
        (R::Submitter, I::RejectedByReviewer2, I::Draft),
        (R::Reviewer2, I::Approved, I::PaymentApproved),
    ]
}

#[test]
fn every_non_whitelisted_invoice_transition_is_denied() {
    let whitelist = invoice_whitelist();
    for role in R::ALL {
        for current in I::ALL {
            for target in I::ALL {
                let expected = whitelist.contains(&(role, current, target));
                assert_eq!(
                    can_transition_invoice(role, current, target),
                    expected,
                    "role={:?} current={:?} target={:?}",
                    role,
                    current,
                    target
                );
            }
        }
    }
}

#[test]
fn payment_approved_invoice_is_terminal() {
    assert!(invoice_targets(I::PaymentApproved).is_empty());
}
