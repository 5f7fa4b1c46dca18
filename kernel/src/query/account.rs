use crate::database::Transaction;
use crate::entity::{Account, AccountId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait AccountQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &AccountId,
    ) -> error_stack::Result<Option<Account>, KernelError>;
}

pub trait DependOnAccountQuery<Connection: Transaction>: Sync + Send + 'static {
    type AccountQuery: AccountQuery<Connection>;
    fn account_query(&self) -> &Self::AccountQuery;
}
