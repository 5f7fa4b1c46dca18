use kernel::interface::database::{
    DatabaseConnection, DependOnDatabaseConnection, Transaction,
};
use kernel::interface::query::{AccountQuery, DependOnAccountQuery};
use kernel::interface::update::{AccountModifier, DependOnAccountModifier};
use kernel::prelude::entity::{AccountDraft, AccountId, AccountName};
use kernel::KernelError;

use crate::transfer::{AccountDto, CreateAccountDto, GetAccountDto};

#[async_trait::async_trait]
pub trait CreateAccountService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnAccountModifier<Connection>
{
    async fn create_account(
        &self,
        dto: CreateAccountDto,
    ) -> error_stack::Result<AccountDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let draft = AccountDraft::new(AccountName::new(dto.name), dto.role);
        let account = self
            .account_modifier()
            .create(&mut connection, &draft)
            .await?;
        connection.commit().await?;

        Ok(AccountDto::from(account))
    }
}

impl<Connection: Transaction + Send, T> CreateAccountService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnAccountModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait GetAccountService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnAccountQuery<Connection>
{
    async fn get_account(
        &self,
        dto: GetAccountDto,
    ) -> error_stack::Result<Option<AccountDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let account = self
            .account_query()
            .find_by_id(&mut connection, &AccountId::new(dto.id))
            .await?;
        Ok(account.map(AccountDto::from))
    }
}

impl<Connection: Transaction + Send, T> GetAccountService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnAccountQuery<Connection>
{
}
