use sqlx::PgConnection;

use kernel::interface::query::{AccountQuery, DependOnAccountQuery};
use kernel::interface::update::{AccountModifier, DependOnAccountModifier};
use kernel::prelude::entity::{Account, AccountDraft, AccountId, AccountName, AccountRole};
use kernel::KernelError;

use crate::database::postgres::{PgTransaction, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresAccountRepository;

#[async_trait::async_trait]
impl AccountQuery<PgTransaction> for PostgresAccountRepository {
    async fn find_by_id(
        &self,
        con: &mut PgTransaction,
        id: &AccountId,
    ) -> error_stack::Result<Option<Account>, KernelError> {
        PgAccountInternal::find_by_id(con.as_conn(), id).await
    }
}

#[async_trait::async_trait]
impl AccountModifier<PgTransaction> for PostgresAccountRepository {
    async fn create(
        &self,
        con: &mut PgTransaction,
        draft: &AccountDraft,
    ) -> error_stack::Result<Account, KernelError> {
        PgAccountInternal::create(con.as_conn(), draft).await
    }
}

impl DependOnAccountQuery<PgTransaction> for PostgresDatabase {
    type AccountQuery = PostgresAccountRepository;
    fn account_query(&self) -> &Self::AccountQuery {
        &PostgresAccountRepository
    }
}

impl DependOnAccountModifier<PgTransaction> for PostgresDatabase {
    type AccountModifier = PostgresAccountRepository;
    fn account_modifier(&self) -> &Self::AccountModifier {
        &PostgresAccountRepository
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    display_name: String,
    role: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = error_stack::Report<KernelError>;

    fn try_from(value: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account::new(
            AccountId::new(value.id),
            AccountName::new(value.display_name),
            value.role.parse::<AccountRole>()?,
        ))
    }
}

pub(in crate::database) struct PgAccountInternal;

impl PgAccountInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &AccountId,
    ) -> error_stack::Result<Option<Account>, KernelError> {
        let row = sqlx::query_as::<_, AccountRow>(
            // language=postgresql
            r#"
            SELECT id, display_name, role
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Account::try_from).transpose()
    }

    async fn create(
        con: &mut PgConnection,
        draft: &AccountDraft,
    ) -> error_stack::Result<Account, KernelError> {
        let row = sqlx::query_as::<_, AccountRow>(
            // language=postgresql
            r#"
            INSERT INTO accounts (display_name, role)
            VALUES ($1, $2)
            RETURNING id, display_name, role
            "#,
        )
        .bind(draft.name().as_ref())
        .bind(draft.role().as_str())
        .fetch_one(con)
        .await
        .convert_error()?;
        Account::try_from(row)
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::AccountQuery;
    use kernel::interface::update::AccountModifier;
    use kernel::prelude::entity::{AccountDraft, AccountName, AccountRole};
    use kernel::KernelError;

    use crate::database::postgres::{PostgresAccountRepository, PostgresDatabase};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let name = AccountName::new(format!("account-{}", rand::random::<u32>()));
        let draft = AccountDraft::new(name.clone(), AccountRole::GameOwner);
        let created = PostgresAccountRepository.create(&mut con, &draft).await?;
        assert_eq!(created.name(), &name);
        assert_eq!(created.role(), &AccountRole::GameOwner);

        let found = PostgresAccountRepository
            .find_by_id(&mut con, created.id())
            .await?;
        assert_eq!(found, Some(created));
        Ok(())
    }
}
