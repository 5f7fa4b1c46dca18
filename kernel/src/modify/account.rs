use crate::database::Transaction;
use crate::entity::{Account, AccountDraft};
use crate::KernelError;

#[async_trait::async_trait]
pub trait AccountModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(
        &self,
        con: &mut Connection,
        draft: &AccountDraft,
    ) -> error_stack::Result<Account, KernelError>;
}

pub trait DependOnAccountModifier<Connection: Transaction>: 'static + Sync + Send {
    type AccountModifier: AccountModifier<Connection>;
    fn account_modifier(&self) -> &Self::AccountModifier;
}
