//! Purchase request approval workflow.
//!
//! The legal moves are:
//!
//! ```text
//! Draft -> Submitted -> Approved -> On Process -> Closed
//!              |
//!              v
//!           Rejected
//! ```
//!
//! Rejected and Closed are terminal. A rejected request can still be edited,
//! but no action moves it on.
//! Every status change appends exactly one history entry in the same database
//! transaction that updates the status.

use crate::{
    core::purchase_request::{append_history, get_purchase_request},
    entities::purchase_request,
    errors::{Error, Result},
    models::{PrHistoryLog, PurchaseRequest, User, UserRole, WorkflowStatus},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

impl WorkflowStatus {
    /// Valid successor states from this state.
    #[must_use]
    pub const fn valid_transitions(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Submitted],
            Self::Submitted => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::OnProcess],
            Self::OnProcess => &[Self::Closed],
            Self::Rejected | Self::Closed => &[],
        }
    }

    /// Check if transitioning to `target` is valid.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }
}

/// The buttons a user presses to move a request along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum WorkflowAction {
    Submit,
    Approve,
    Reject,
    Process,
    Close,
}

impl WorkflowAction {
    /// Status the request ends up in.
    #[must_use]
    pub const fn target(self) -> WorkflowStatus {
        match self {
            Self::Submit => WorkflowStatus::Submitted,
            Self::Approve => WorkflowStatus::Approved,
            Self::Reject => WorkflowStatus::Rejected,
            Self::Process => WorkflowStatus::OnProcess,
            Self::Close => WorkflowStatus::Closed,
        }
    }

    /// The action that leads to `target`, if any does.
    #[must_use]
    pub const fn for_target(target: WorkflowStatus) -> Option<Self> {
        match target {
            WorkflowStatus::Submitted => Some(Self::Submit),
            WorkflowStatus::Approved => Some(Self::Approve),
            WorkflowStatus::Rejected => Some(Self::Reject),
            WorkflowStatus::OnProcess => Some(Self::Process),
            WorkflowStatus::Closed => Some(Self::Close),
            WorkflowStatus::Draft => None,
        }
    }

    /// Whether `role` may perform this action.
    #[must_use]
    pub const fn allowed_for(self, role: UserRole) -> bool {
        match self {
            Self::Submit => true,
            Self::Approve | Self::Reject | Self::Process | Self::Close => role.can_approve(),
        }
    }

    /// Lowercase verb used in messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Process => "process",
            Self::Close => "close",
        }
    }
}

/// The actions `role` can take on a request currently in `status`.
#[must_use]
pub fn available_actions(status: WorkflowStatus, role: UserRole) -> Vec<WorkflowAction> {
    status
        .valid_transitions()
        .iter()
        .filter_map(|target| WorkflowAction::for_target(*target))
        .filter(|action| action.allowed_for(role))
        .collect()
}

/// Header and items may only be changed while Draft or Rejected.
#[must_use]
pub const fn is_editable(status: WorkflowStatus) -> bool {
    matches!(status, WorkflowStatus::Draft | WorkflowStatus::Rejected)
}

/// Requests may not be deleted once they have been Approved.
#[must_use]
pub const fn can_delete(status: WorkflowStatus) -> bool {
    !matches!(
        status,
        WorkflowStatus::Approved | WorkflowStatus::OnProcess | WorkflowStatus::Closed
    )
}

/// Moves a purchase request to `target` on behalf of `actor`.
///
/// Checks, in order: the request exists, the move is legal from the current
/// status, the actor's role allows it, and a rejection carries a note. On
/// success the status change and its history entry
/// (`"Changed status to <target>"`) are written in one transaction.
pub async fn transition_purchase_request(
    db: &DatabaseConnection,
    pr_id: &str,
    target: WorkflowStatus,
    note: Option<&str>,
    actor: &User,
) -> Result<PurchaseRequest> {
    let txn = db.begin().await?;
    let mut request = get_purchase_request(&txn, pr_id)
        .await?
        .ok_or_else(|| Error::not_found("Purchase request", pr_id))?;

    let from = request.status;
    let action = WorkflowAction::for_target(target)
        .filter(|_| from.can_transition_to(target))
        .ok_or_else(|| Error::IllegalTransition {
            from: from.to_string(),
            to: target.to_string(),
        })?;

    if !action.allowed_for(actor.role) {
        return Err(Error::Unauthorized {
            role: actor.role.to_string(),
            action: format!("{} purchase requests", action.verb()),
        });
    }

    let note = note.map(str::trim).unwrap_or_default();
    if target == WorkflowStatus::Rejected && note.is_empty() {
        return Err(Error::validation("A reason is required to reject a request."));
    }

    purchase_request::ActiveModel {
        id: Set(request.id.clone()),
        status: Set(target.as_str().to_string()),
        ..Default::default()
    }
    .update(&txn)
    .await?;

    let entry = PrHistoryLog {
        date: Utc::now(),
        user: actor.name.clone(),
        action: format!("Changed status to {target}"),
        notes: note.to_string(),
    };
    append_history(&txn, &request.id, &entry).await?;
    txn.commit().await?;

    info!(
        "{} moved purchase request {} from {} to {}",
        actor.username, request.pr_number, from, target
    );

    request.status = target;
    request.history.push(entry);
    Ok(request)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::purchase_request::add_purchase_request;
    use crate::test_utils::*;

    #[test]
    fn test_valid_transitions() {
        use WorkflowStatus::{Approved, Closed, Draft, OnProcess, Rejected, Submitted};

        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(OnProcess));
        assert!(OnProcess.can_transition_to(Closed));

        assert!(!Draft.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Submitted.can_transition_to(Draft));
        assert!(!Rejected.can_transition_to(Submitted));
        assert!(Rejected.valid_transitions().is_empty());
        assert!(Closed.valid_transitions().is_empty());
    }

    #[test]
    fn test_editable_and_deletable_statuses() {
        let editable: Vec<_> = WorkflowStatus::ALL
            .into_iter()
            .filter(|s| is_editable(*s))
            .collect();
        assert_eq!(editable, vec![WorkflowStatus::Draft, WorkflowStatus::Rejected]);

        let deletable: Vec<_> = WorkflowStatus::ALL
            .into_iter()
            .filter(|s| can_delete(*s))
            .collect();
        assert_eq!(
            deletable,
            vec![
                WorkflowStatus::Draft,
                WorkflowStatus::Submitted,
                WorkflowStatus::Rejected
            ]
        );
    }

    #[test]
    fn test_available_actions_depend_on_role() {
        assert_eq!(
            available_actions(WorkflowStatus::Submitted, UserRole::Approver),
            vec![WorkflowAction::Approve, WorkflowAction::Reject]
        );
        assert!(available_actions(WorkflowStatus::Submitted, UserRole::User).is_empty());
        assert!(available_actions(WorkflowStatus::Submitted, UserRole::Finance).is_empty());
        assert_eq!(
            available_actions(WorkflowStatus::Draft, UserRole::User),
            vec![WorkflowAction::Submit]
        );
        assert!(available_actions(WorkflowStatus::Closed, UserRole::Admin).is_empty());
    }

    async fn setup_with_request() -> Result<(DatabaseConnection, User, User)> {
        let db = setup_test_db().await?;
        let requester = test_user("u2", "user", UserRole::User);
        let approver = test_user("u3", "approver", UserRole::Approver);
        add_purchase_request(
            &db,
            sample_purchase_request("pr1", "cat1", vec![sample_pr_item(None, 1, 100.0)]),
            &requester,
        )
        .await?;
        Ok((db, requester, approver))
    }

    #[tokio::test]
    async fn test_full_lifecycle_appends_one_entry_per_step() -> Result<()> {
        let (db, requester, approver) = setup_with_request().await?;

        transition_purchase_request(&db, "pr1", WorkflowStatus::Submitted, None, &requester)
            .await?;
        transition_purchase_request(&db, "pr1", WorkflowStatus::Approved, Some("ok"), &approver)
            .await?;
        transition_purchase_request(&db, "pr1", WorkflowStatus::OnProcess, None, &approver)
            .await?;
        let closed =
            transition_purchase_request(&db, "pr1", WorkflowStatus::Closed, None, &approver)
                .await?;
        assert_eq!(closed.status, WorkflowStatus::Closed);

        let stored = get_purchase_request(&db, "pr1").await?.unwrap();
        assert_eq!(stored.status, WorkflowStatus::Closed);
        let actions: Vec<_> = stored.history.iter().map(|h| h.action.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "Created",
                "Changed status to Submitted",
                "Changed status to Approved",
                "Changed status to On Process",
                "Changed status to Closed",
            ]
        );
        assert_eq!(stored.history[2].user, approver.name);
        assert_eq!(stored.history[2].notes, "ok");
        assert_eq!(stored.history[3].notes, "");

        Ok(())
    }

    #[tokio::test]
    async fn test_illegal_transition_leaves_request_untouched() -> Result<()> {
        let (db, _, approver) = setup_with_request().await?;

        let result =
            transition_purchase_request(&db, "pr1", WorkflowStatus::Approved, None, &approver)
                .await;
        assert!(matches!(result, Err(Error::IllegalTransition { .. })));

        let stored = get_purchase_request(&db, "pr1").await?.unwrap();
        assert_eq!(stored.status, WorkflowStatus::Draft);
        assert_eq!(stored.history.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_requester_cannot_approve() -> Result<()> {
        let (db, requester, _) = setup_with_request().await?;
        transition_purchase_request(&db, "pr1", WorkflowStatus::Submitted, None, &requester)
            .await?;

        let result =
            transition_purchase_request(&db, "pr1", WorkflowStatus::Approved, None, &requester)
                .await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        let stored = get_purchase_request(&db, "pr1").await?.unwrap();
        assert_eq!(stored.status, WorkflowStatus::Submitted);

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_requires_note_and_is_final() -> Result<()> {
        let (db, requester, approver) = setup_with_request().await?;
        transition_purchase_request(&db, "pr1", WorkflowStatus::Submitted, None, &requester)
            .await?;

        let blank =
            transition_purchase_request(&db, "pr1", WorkflowStatus::Rejected, Some("  "), &approver)
                .await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        transition_purchase_request(
            &db,
            "pr1",
            WorkflowStatus::Rejected,
            Some("Quote missing"),
            &approver,
        )
        .await?;
        let resubmit =
            transition_purchase_request(&db, "pr1", WorkflowStatus::Submitted, None, &requester)
                .await;
        assert!(matches!(resubmit, Err(Error::IllegalTransition { .. })));
        assert!(available_actions(WorkflowStatus::Rejected, UserRole::Admin).is_empty());

        let stored = get_purchase_request(&db, "pr1").await?.unwrap();
        assert_eq!(stored.status, WorkflowStatus::Rejected);
        assert!(is_editable(stored.status));
        assert_eq!(stored.history.len(), 3);
        assert_eq!(stored.history[2].notes, "Quote missing");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_request_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = test_user("u1", "admin", UserRole::Admin);
        let result =
            transition_purchase_request(&db, "nope", WorkflowStatus::Submitted, None, &admin).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }
}
