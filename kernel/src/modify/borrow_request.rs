use crate::database::Transaction;
use crate::entity::{BorrowRequest, BorrowRequestDraft, BorrowRequestId, BorrowRequestStatus};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BorrowRequestModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(
        &self,
        con: &mut Connection,
        draft: &BorrowRequestDraft,
    ) -> error_stack::Result<BorrowRequest, KernelError>;

    /// Compare-and-set: applies `next` only if the stored status is still
    /// PENDING. `false` reports the losing side of a race or a request
    /// already settled.
    async fn transition_from_pending(
        &self,
        con: &mut Connection,
        id: &BorrowRequestId,
        next: &BorrowRequestStatus,
    ) -> error_stack::Result<bool, KernelError>;

    /// Conditional delete: removes the request only while it is PENDING.
    async fn delete_pending(
        &self,
        con: &mut Connection,
        id: &BorrowRequestId,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnBorrowRequestModifier<Connection: Transaction>: 'static + Sync + Send {
    type BorrowRequestModifier: BorrowRequestModifier<Connection>;
    fn borrow_request_modifier(&self) -> &Self::BorrowRequestModifier;
}
