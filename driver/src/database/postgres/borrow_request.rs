use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::{BorrowRequestQuery, DependOnBorrowRequestQuery};
use kernel::interface::update::{BorrowRequestModifier, DependOnBorrowRequestModifier};
use kernel::prelude::entity::{
    AccountId, BorrowRequest, BorrowRequestDraft, BorrowRequestId, BorrowRequestStatus, CreatedAt,
    GameId, LoanPeriod,
};
use kernel::KernelError;

use crate::database::postgres::{PgTransaction, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresBorrowRequestRepository;

#[async_trait::async_trait]
impl BorrowRequestQuery<PgTransaction> for PostgresBorrowRequestRepository {
    async fn find_by_id(
        &self,
        con: &mut PgTransaction,
        id: &BorrowRequestId,
    ) -> error_stack::Result<Option<BorrowRequest>, KernelError> {
        PgBorrowRequestInternal::find_by_id(con.as_conn(), id).await
    }

    async fn find_by_requester(
        &self,
        con: &mut PgTransaction,
        requester_id: &AccountId,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError> {
        PgBorrowRequestInternal::find_by_requester(con.as_conn(), requester_id).await
    }

    async fn find_by_status(
        &self,
        con: &mut PgTransaction,
        status: &BorrowRequestStatus,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError> {
        PgBorrowRequestInternal::find_by_status(con.as_conn(), status).await
    }
}

#[async_trait::async_trait]
impl BorrowRequestModifier<PgTransaction> for PostgresBorrowRequestRepository {
    async fn create(
        &self,
        con: &mut PgTransaction,
        draft: &BorrowRequestDraft,
    ) -> error_stack::Result<BorrowRequest, KernelError> {
        PgBorrowRequestInternal::create(con.as_conn(), draft).await
    }

    async fn transition_from_pending(
        &self,
        con: &mut PgTransaction,
        id: &BorrowRequestId,
        next: &BorrowRequestStatus,
    ) -> error_stack::Result<bool, KernelError> {
        PgBorrowRequestInternal::transition_from_pending(con.as_conn(), id, next).await
    }

    async fn delete_pending(
        &self,
        con: &mut PgTransaction,
        id: &BorrowRequestId,
    ) -> error_stack::Result<bool, KernelError> {
        PgBorrowRequestInternal::delete_pending(con.as_conn(), id).await
    }
}

impl DependOnBorrowRequestQuery<PgTransaction> for PostgresDatabase {
    type BorrowRequestQuery = PostgresBorrowRequestRepository;
    fn borrow_request_query(&self) -> &Self::BorrowRequestQuery {
        &PostgresBorrowRequestRepository
    }
}

impl DependOnBorrowRequestModifier<PgTransaction> for PostgresDatabase {
    type BorrowRequestModifier = PostgresBorrowRequestRepository;
    fn borrow_request_modifier(&self) -> &Self::BorrowRequestModifier {
        &PostgresBorrowRequestRepository
    }
}

#[derive(sqlx::FromRow)]
struct BorrowRequestRow {
    id: i64,
    requester_id: i64,
    game_id: i64,
    start_date: OffsetDateTime,
    end_date: OffsetDateTime,
    status: String,
    requested_at: OffsetDateTime,
}

impl TryFrom<BorrowRequestRow> for BorrowRequest {
    type Error = error_stack::Report<KernelError>;

    fn try_from(value: BorrowRequestRow) -> Result<Self, Self::Error> {
        Ok(BorrowRequest::new(
            BorrowRequestId::new(value.id),
            AccountId::new(value.requester_id),
            GameId::new(value.game_id),
            LoanPeriod::new(value.start_date, value.end_date)?,
            value.status.parse::<BorrowRequestStatus>()?,
            CreatedAt::new(value.requested_at),
        ))
    }
}

pub(in crate::database) struct PgBorrowRequestInternal;

impl PgBorrowRequestInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BorrowRequestId,
    ) -> error_stack::Result<Option<BorrowRequest>, KernelError> {
        let row = sqlx::query_as::<_, BorrowRequestRow>(
            // language=postgresql
            r#"
            SELECT id, requester_id, game_id, start_date, end_date, status, requested_at
            FROM borrow_requests
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(BorrowRequest::try_from).transpose()
    }

    async fn find_by_requester(
        con: &mut PgConnection,
        requester_id: &AccountId,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError> {
        let rows = sqlx::query_as::<_, BorrowRequestRow>(
            // language=postgresql
            r#"
            SELECT id, requester_id, game_id, start_date, end_date, status, requested_at
            FROM borrow_requests
            WHERE requester_id = $1
            ORDER BY id
            "#,
        )
        .bind(requester_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(BorrowRequest::try_from).collect()
    }

    async fn find_by_status(
        con: &mut PgConnection,
        status: &BorrowRequestStatus,
    ) -> error_stack::Result<Vec<BorrowRequest>, KernelError> {
        let rows = sqlx::query_as::<_, BorrowRequestRow>(
            // language=postgresql
            r#"
            SELECT id, requester_id, game_id, start_date, end_date, status, requested_at
            FROM borrow_requests
            WHERE status = $1
            ORDER BY id
            "#,
        )
        .bind(status.as_str())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(BorrowRequest::try_from).collect()
    }

    async fn create(
        con: &mut PgConnection,
        draft: &BorrowRequestDraft,
    ) -> error_stack::Result<BorrowRequest, KernelError> {
        let row = sqlx::query_as::<_, BorrowRequestRow>(
            // language=postgresql
            r#"
            INSERT INTO borrow_requests (requester_id, game_id, start_date, end_date, status, requested_at)
            VALUES ($1, $2, $3, $4, 'PENDING', $5)
            RETURNING id, requester_id, game_id, start_date, end_date, status, requested_at
            "#,
        )
        .bind(draft.requester_id().as_ref())
        .bind(draft.game_id().as_ref())
        .bind(draft.period().start())
        .bind(draft.period().end())
        .bind(draft.requested_at().as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        BorrowRequest::try_from(row)
    }

    async fn transition_from_pending(
        con: &mut PgConnection,
        id: &BorrowRequestId,
        next: &BorrowRequestStatus,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE borrow_requests
            SET status = $2
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id.as_ref())
        .bind(next.as_str())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_pending(
        con: &mut PgConnection,
        id: &BorrowRequestId,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM borrow_requests
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::BorrowRequestQuery;
    use kernel::interface::update::{
        AccountModifier, BorrowRequestModifier, GameModifier,
    };
    use kernel::prelude::entity::{
        AccountDraft, AccountName, AccountRole, BorrowRequestDraft, BorrowRequestStatus,
        CreatedAt, GameDraft, GameTitle, LoanPeriod,
    };
    use kernel::KernelError;
    use time::macros::datetime;

    use crate::database::postgres::{
        PostgresAccountRepository, PostgresBorrowRequestRepository, PostgresDatabase,
        PostgresGameRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;

        let owner = PostgresAccountRepository
            .create(
                &mut con,
                &AccountDraft::new(
                    AccountName::new(format!("owner-{}", rand::random::<u32>())),
                    AccountRole::GameOwner,
                ),
            )
            .await?;
        let requester = PostgresAccountRepository
            .create(
                &mut con,
                &AccountDraft::new(
                    AccountName::new(format!("requester-{}", rand::random::<u32>())),
                    AccountRole::User,
                ),
            )
            .await?;
        let game = PostgresGameRepository
            .create(
                &mut con,
                &GameDraft::new(GameTitle::new("Terraforming Mars"), owner.id().clone()),
            )
            .await?;

        let draft = BorrowRequestDraft::new(
            requester.id().clone(),
            game.id().clone(),
            LoanPeriod::new(
                datetime!(2024-01-01 00:00 UTC),
                datetime!(2024-01-07 00:00 UTC),
            )?,
            CreatedAt::new(datetime!(2023-12-30 12:00 UTC)),
        );
        let request = PostgresBorrowRequestRepository.create(&mut con, &draft).await?;
        assert!(request.status().is_pending());

        let moved = PostgresBorrowRequestRepository
            .transition_from_pending(&mut con, request.id(), &BorrowRequestStatus::Approved)
            .await?;
        assert!(moved);

        // the compare-and-set refuses a second settle
        let raced = PostgresBorrowRequestRepository
            .transition_from_pending(&mut con, request.id(), &BorrowRequestStatus::Declined)
            .await?;
        assert!(!raced);

        let found = PostgresBorrowRequestRepository
            .find_by_id(&mut con, request.id())
            .await?
            .expect("request must exist");
        assert_eq!(found.status(), &BorrowRequestStatus::Approved);

        // settled requests are no longer deletable
        let deleted = PostgresBorrowRequestRepository
            .delete_pending(&mut con, request.id())
            .await?;
        assert!(!deleted);
        Ok(())
    }
}
