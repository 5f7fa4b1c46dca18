use serde::{Deserialize, Serialize};

use crate::entity::{BorrowRequestId, LendingRecordId};
use crate::KernelError;

/// Facts worth telling the parties about after a transition committed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoanNotice {
    RequestApproved {
        request_id: BorrowRequestId,
        record_id: LendingRecordId,
    },
    RequestDeclined {
        request_id: BorrowRequestId,
    },
    ReturnMarked {
        record_id: LendingRecordId,
    },
    DisputeRaised {
        record_id: LendingRecordId,
    },
    RecordClosed {
        record_id: LendingRecordId,
        damaged: bool,
    },
}

/// Best-effort delivery. Publishing happens after the owning transaction has
/// committed; a failure here is logged by the caller and never rolls the
/// transition back.
#[async_trait::async_trait]
pub trait LoanNotifier: 'static + Sync + Send {
    async fn publish(&self, notice: &LoanNotice) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnLoanNotifier: 'static + Sync + Send {
    type LoanNotifier: LoanNotifier;
    fn loan_notifier(&self) -> &Self::LoanNotifier;
}
