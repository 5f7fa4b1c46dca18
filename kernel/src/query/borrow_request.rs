use crate::database::Transaction;
use crate::entity::{AccountId, BorrowRequest, BorrowRequestId, BorrowRequestStatus};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BorrowRequestQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &BorrowRequestId,
    ) -> error_stack::Result<Option<BorrowRequest>, KernelError>;

    async fn find_by_requester(
        &self,
        con: &mut Connection,
        requester_id: &AccountId,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError>;

    async fn find_by_status(
        &self,
        con: &mut Connection,
        status: &BorrowRequestStatus,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError>;
}

pub trait DependOnBorrowRequestQuery<Connection: Transaction>: Sync + Send + 'static {
    type BorrowRequestQuery: BorrowRequestQuery<Connection>;
    fn borrow_request_query(&self) -> &Self::BorrowRequestQuery;
}
