use error_stack::Report;

use crate::entity::{Account, AccountId, AccountRole};
use crate::KernelError;

/// Status-changing operations guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    ApproveRequest,
    DeclineRequest,
    WithdrawRequest,
    MarkReturned,
    RaiseDispute,
    CloseRecord,
    CancelRegistration,
    ReviseEvent,
}

/// The parties of the resource a transition targets.
///
/// Callers resolve ownership (e.g. the game owner behind a borrow request)
/// before consulting the gate, so the decision stays a pure function.
#[derive(Debug, Clone, Copy)]
pub enum GuardedResource<'a> {
    Request {
        game_owner: &'a AccountId,
        requester: &'a AccountId,
    },
    Record {
        owner: &'a AccountId,
        borrower: &'a AccountId,
    },
    Registration {
        attendee: &'a AccountId,
    },
    Event {
        host: &'a AccountId,
    },
}

/// Decides whether `principal` may perform `action` on `resource`.
///
/// Owner-side actions additionally require the game-owner role flag, so a
/// plain account that somehow ends up referenced as an owner still cannot
/// drive owner transitions.
pub fn can_transition(
    principal: &Account,
    resource: GuardedResource,
    action: TransitionAction,
) -> bool {
    use GuardedResource::*;
    use TransitionAction::*;

    let id = principal.id();
    match (resource, action) {
        (Request { game_owner, .. }, ApproveRequest | DeclineRequest) => {
            id == game_owner && principal.role() == &AccountRole::GameOwner
        }
        (Request { requester, .. }, WithdrawRequest) => id == requester,
        (Record { owner, .. }, CloseRecord) => {
            id == owner && principal.role() == &AccountRole::GameOwner
        }
        (Record { borrower, .. }, MarkReturned) => id == borrower,
        (Record { owner, borrower }, RaiseDispute) => id == owner || id == borrower,
        (Registration { attendee }, CancelRegistration) => id == attendee,
        (Event { host }, ReviseEvent) => id == host,
        _ => false,
    }
}

pub fn ensure_transition(
    principal: &Account,
    resource: GuardedResource,
    action: TransitionAction,
) -> error_stack::Result<(), KernelError> {
    if can_transition(principal, resource, action) {
        Ok(())
    } else {
        Err(Report::new(KernelError::Forbidden)
            .attach_printable(format!("account {} may not {action:?}", principal.id().as_ref())))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::{Account, AccountId, AccountName, AccountRole};

    fn account(id: i64, role: AccountRole) -> Account {
        Account::new(AccountId::new(id), AccountName::new("someone"), role)
    }

    #[test]
    fn owner_actions_require_ownership_and_role() {
        let owner = account(1, AccountRole::GameOwner);
        let requester = account(2, AccountRole::User);
        let outsider = account(3, AccountRole::GameOwner);
        let resource = GuardedResource::Request {
            game_owner: &AccountId::new(1),
            requester: &AccountId::new(2),
        };

        assert!(can_transition(&owner, resource, TransitionAction::ApproveRequest));
        assert!(can_transition(&owner, resource, TransitionAction::DeclineRequest));
        assert!(!can_transition(&requester, resource, TransitionAction::ApproveRequest));
        assert!(!can_transition(&outsider, resource, TransitionAction::ApproveRequest));

        // owning account without the role flag is still refused
        let unflagged = account(1, AccountRole::User);
        assert!(!can_transition(&unflagged, resource, TransitionAction::ApproveRequest));
    }

    #[test]
    fn requester_may_only_withdraw_own_request() {
        let requester = account(2, AccountRole::User);
        let owner = account(1, AccountRole::GameOwner);
        let resource = GuardedResource::Request {
            game_owner: &AccountId::new(1),
            requester: &AccountId::new(2),
        };

        assert!(can_transition(&requester, resource, TransitionAction::WithdrawRequest));
        assert!(!can_transition(&owner, resource, TransitionAction::WithdrawRequest));
    }

    #[test]
    fn dispute_is_open_to_both_parties_close_to_owner_only() {
        let owner = account(1, AccountRole::GameOwner);
        let borrower = account(2, AccountRole::User);
        let outsider = account(3, AccountRole::User);
        let resource = GuardedResource::Record {
            owner: &AccountId::new(1),
            borrower: &AccountId::new(2),
        };

        assert!(can_transition(&owner, resource, TransitionAction::RaiseDispute));
        assert!(can_transition(&borrower, resource, TransitionAction::RaiseDispute));
        assert!(!can_transition(&outsider, resource, TransitionAction::RaiseDispute));

        assert!(can_transition(&owner, resource, TransitionAction::CloseRecord));
        assert!(!can_transition(&borrower, resource, TransitionAction::CloseRecord));

        assert!(can_transition(&borrower, resource, TransitionAction::MarkReturned));
        assert!(!can_transition(&owner, resource, TransitionAction::MarkReturned));
    }

    #[test]
    fn registration_is_cancellable_by_its_attendee_only() {
        let attendee = account(5, AccountRole::User);
        let other = account(6, AccountRole::User);
        let resource = GuardedResource::Registration {
            attendee: &AccountId::new(5),
        };

        assert!(can_transition(&attendee, resource, TransitionAction::CancelRegistration));
        assert!(!can_transition(&other, resource, TransitionAction::CancelRegistration));
    }

    #[test]
    fn ensure_transition_reports_forbidden() {
        let outsider = account(9, AccountRole::User);
        let resource = GuardedResource::Event {
            host: &AccountId::new(1),
        };
        let denied = ensure_transition(&outsider, resource, TransitionAction::ReviseEvent)
            .expect_err("must be denied");
        assert!(matches!(denied.current_context(), KernelError::Forbidden));
    }
}
