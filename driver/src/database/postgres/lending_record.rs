use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::{
    DependOnLendingRecordQuery, LendingRecordFilter, LendingRecordQuery,
};
use kernel::interface::update::{DependOnLendingRecordModifier, LendingRecordModifier};
use kernel::prelude::entity::{
    AccountId, BorrowRequestId, ClosedAt, DamageReport, GameId, LendingRecord,
    LendingRecordDraft, LendingRecordId, LendingStatus, LoanPeriod, Page, PageSelection,
};
use kernel::KernelError;

use crate::database::postgres::{PgTransaction, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresLendingRecordRepository;

#[async_trait::async_trait]
impl LendingRecordQuery<PgTransaction> for PostgresLendingRecordRepository {
    async fn find_by_id(
        &self,
        con: &mut PgTransaction,
        id: &LendingRecordId,
    ) -> error_stack::Result<Option<LendingRecord>, KernelError> {
        PgLendingRecordInternal::find_by_id(con.as_conn(), id).await
    }

    async fn find_filtered(
        &self,
        con: &mut PgTransaction,
        filter: &LendingRecordFilter,
        selection: &PageSelection,
    ) -> error_stack::Result<Page<LendingRecord>, KernelError> {
        PgLendingRecordInternal::find_filtered(con.as_conn(), filter, selection).await
    }

    async fn find_overdue(
        &self,
        con: &mut PgTransaction,
        now: &OffsetDateTime,
    ) -> error_stack::Result<Vec<LendingRecord>, KernelError> {
        PgLendingRecordInternal::find_overdue(con.as_conn(), now).await
    }
}

#[async_trait::async_trait]
impl LendingRecordModifier<PgTransaction> for PostgresLendingRecordRepository {
    async fn create(
        &self,
        con: &mut PgTransaction,
        draft: &LendingRecordDraft,
    ) -> error_stack::Result<LendingRecord, KernelError> {
        PgLendingRecordInternal::create(con.as_conn(), draft).await
    }

    async fn mark_returned(
        &self,
        con: &mut PgTransaction,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError> {
        PgLendingRecordInternal::mark_returned(con.as_conn(), id).await
    }

    async fn dispute(
        &self,
        con: &mut PgTransaction,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError> {
        PgLendingRecordInternal::dispute(con.as_conn(), id).await
    }

    async fn close(
        &self,
        con: &mut PgTransaction,
        id: &LendingRecordId,
        damage: &DamageReport,
        closed_at: &ClosedAt,
    ) -> error_stack::Result<bool, KernelError> {
        PgLendingRecordInternal::close(con.as_conn(), id, damage, closed_at).await
    }
}

impl DependOnLendingRecordQuery<PgTransaction> for PostgresDatabase {
    type LendingRecordQuery = PostgresLendingRecordRepository;
    fn lending_record_query(&self) -> &Self::LendingRecordQuery {
        &PostgresLendingRecordRepository
    }
}

impl DependOnLendingRecordModifier<PgTransaction> for PostgresDatabase {
    type LendingRecordModifier = PostgresLendingRecordRepository;
    fn lending_record_modifier(&self) -> &Self::LendingRecordModifier {
        &PostgresLendingRecordRepository
    }
}

#[derive(sqlx::FromRow)]
struct LendingRecordRow {
    id: i64,
    request_id: i64,
    game_id: i64,
    owner_id: i64,
    borrower_id: i64,
    start_date: OffsetDateTime,
    end_date: OffsetDateTime,
    status: String,
    damaged: Option<bool>,
    damage_notes: Option<String>,
    closed_at: Option<OffsetDateTime>,
}

impl TryFrom<LendingRecordRow> for LendingRecord {
    type Error = error_stack::Report<KernelError>;

    fn try_from(value: LendingRecordRow) -> Result<Self, Self::Error> {
        let damage = value
            .damaged
            .map(|flagged| DamageReport::new(flagged, value.damage_notes));
        Ok(LendingRecord::new(
            LendingRecordId::new(value.id),
            BorrowRequestId::new(value.request_id),
            GameId::new(value.game_id),
            AccountId::new(value.owner_id),
            AccountId::new(value.borrower_id),
            LoanPeriod::new(value.start_date, value.end_date)?,
            value.status.parse::<LendingStatus>()?,
            damage,
            value.closed_at.map(ClosedAt::new),
        ))
    }
}

pub(in crate::database) struct PgLendingRecordInternal;

impl PgLendingRecordInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &LendingRecordId,
    ) -> error_stack::Result<Option<LendingRecord>, KernelError> {
        let row = sqlx::query_as::<_, LendingRecordRow>(
            // language=postgresql
            r#"
            SELECT id, request_id, game_id, owner_id, borrower_id,
                   start_date, end_date, status, damaged, damage_notes, closed_at
            FROM lending_records
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(LendingRecord::try_from).transpose()
    }

    async fn find_filtered(
        con: &mut PgConnection,
        filter: &LendingRecordFilter,
        selection: &PageSelection,
    ) -> error_stack::Result<Page<LendingRecord>, KernelError> {
        let status = filter.status.as_ref().map(|status| status.as_str());
        let owner = filter.owner_id.as_ref().map(|id| *id.as_ref());
        let borrower = filter.borrower_id.as_ref().map(|id| *id.as_ref());

        let total: i64 = sqlx::query_scalar(
            // language=postgresql
            r#"
            SELECT COUNT(*)
            FROM lending_records
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR owner_id = $2)
              AND ($3::bigint IS NULL OR borrower_id = $3)
              AND ($4::timestamptz IS NULL OR end_date >= $4)
              AND ($5::timestamptz IS NULL OR start_date <= $5)
            "#,
        )
        .bind(status)
        .bind(owner)
        .bind(borrower)
        .bind(filter.lent_from)
        .bind(filter.lent_until)
        .fetch_one(&mut *con)
        .await
        .convert_error()?;

        let rows = sqlx::query_as::<_, LendingRecordRow>(
            // language=postgresql
            r#"
            SELECT id, request_id, game_id, owner_id, borrower_id,
                   start_date, end_date, status, damaged, damage_notes, closed_at
            FROM lending_records
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::bigint IS NULL OR owner_id = $2)
              AND ($3::bigint IS NULL OR borrower_id = $3)
              AND ($4::timestamptz IS NULL OR end_date >= $4)
              AND ($5::timestamptz IS NULL OR start_date <= $5)
            ORDER BY id
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(status)
        .bind(owner)
        .bind(borrower)
        .bind(filter.lent_from)
        .bind(filter.lent_until)
        .bind(selection.limit())
        .bind(selection.offset())
        .fetch_all(con)
        .await
        .convert_error()?;

        let records = rows
            .into_iter()
            .map(LendingRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(records, total, selection))
    }

    async fn find_overdue(
        con: &mut PgConnection,
        now: &OffsetDateTime,
    ) -> error_stack::Result<Vec<LendingRecord>, KernelError> {
        let rows = sqlx::query_as::<_, LendingRecordRow>(
            // language=postgresql
            r#"
            SELECT id, request_id, game_id, owner_id, borrower_id,
                   start_date, end_date, status, damaged, damage_notes, closed_at
            FROM lending_records
            WHERE status = 'ACTIVE' AND end_date < $1
            ORDER BY end_date
            "#,
        )
        .bind(now)
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(LendingRecord::try_from).collect()
    }

    async fn create(
        con: &mut PgConnection,
        draft: &LendingRecordDraft,
    ) -> error_stack::Result<LendingRecord, KernelError> {
        let row = sqlx::query_as::<_, LendingRecordRow>(
            // language=postgresql
            r#"
            INSERT INTO lending_records (request_id, game_id, owner_id, borrower_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'ACTIVE')
            RETURNING id, request_id, game_id, owner_id, borrower_id,
                      start_date, end_date, status, damaged, damage_notes, closed_at
            "#,
        )
        .bind(draft.request_id().as_ref())
        .bind(draft.game_id().as_ref())
        .bind(draft.owner_id().as_ref())
        .bind(draft.borrower_id().as_ref())
        .bind(draft.period().start())
        .bind(draft.period().end())
        .fetch_one(con)
        .await
        .convert_error()?;
        LendingRecord::try_from(row)
    }

    async fn mark_returned(
        con: &mut PgConnection,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE lending_records
            SET status = 'RETURN_PENDING'
            WHERE id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }

    async fn dispute(
        con: &mut PgConnection,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE lending_records
            SET status = 'DISPUTED'
            WHERE id = $1 AND status IN ('ACTIVE', 'RETURN_PENDING')
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }

    async fn close(
        con: &mut PgConnection,
        id: &LendingRecordId,
        damage: &DamageReport,
        closed_at: &ClosedAt,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE lending_records
            SET status = 'CLOSED', damaged = $2, damage_notes = $3, closed_at = $4
            WHERE id = $1 AND status <> 'CLOSED'
            "#,
        )
        .bind(id.as_ref())
        .bind(damage.flagged())
        .bind(damage.notes().as_deref())
        .bind(closed_at.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::{LendingRecordFilter, LendingRecordQuery};
    use kernel::interface::update::{
        AccountModifier, BorrowRequestModifier, GameModifier, LendingRecordModifier,
    };
    use kernel::prelude::entity::{
        AccountDraft, AccountName, AccountRole, BorrowRequestDraft, ClosedAt, CreatedAt,
        DamageReport, GameDraft, GameTitle, LendingRecordDraft, LendingStatus, LoanPeriod,
        PageSelection,
    };
    use kernel::KernelError;
    use time::macros::datetime;

    use crate::database::postgres::{
        PostgresAccountRepository, PostgresBorrowRequestRepository, PostgresDatabase,
        PostgresGameRepository, PostgresLendingRecordRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;

        // fixtures are committed so the conflict probe below can run in its
        // own transaction (a constraint hit aborts the one it runs in)
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
        let borrower = PostgresAccountRepository
            .create(
                &mut con,
                &AccountDraft::new(
                    AccountName::new(format!("borrower-{}", rand::random::<u32>())),
                    AccountRole::User,
                ),
            )
            .await?;
        let game = PostgresGameRepository
            .create(
                &mut con,
                &GameDraft::new(GameTitle::new("Brass Birmingham"), owner.id().clone()),
            )
            .await?;
        let period = LoanPeriod::new(
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-01-07 00:00 UTC),
        )?;
        let request = PostgresBorrowRequestRepository
            .create(
                &mut con,
                &BorrowRequestDraft::new(
                    borrower.id().clone(),
                    game.id().clone(),
                    period.clone(),
                    CreatedAt::new(datetime!(2023-12-30 12:00 UTC)),
                ),
            )
            .await?;
        let draft = LendingRecordDraft::new(
            request.id().clone(),
            game.id().clone(),
            owner.id().clone(),
            borrower.id().clone(),
            period,
        );
        let record = PostgresLendingRecordRepository.create(&mut con, &draft).await?;
        assert_eq!(record.status(), &LendingStatus::Active);
        con.commit().await?;

        // a second open record for the same request trips the partial index
        let mut con = db.transact().await?;
        let double = PostgresLendingRecordRepository.create(&mut con, &draft).await;
        let conflict = double.expect_err("duplicate open record must be refused");
        assert!(matches!(conflict.current_context(), KernelError::Conflict));
        con.roll_back().await?;

        let mut con = db.transact().await?;
        let overdue = PostgresLendingRecordRepository
            .find_overdue(&mut con, &datetime!(2024-01-10 00:00 UTC))
            .await?;
        assert!(overdue.iter().any(|found| found.id() == record.id()));

        let filtered = PostgresLendingRecordRepository
            .find_filtered(
                &mut con,
                &LendingRecordFilter {
                    owner_id: Some(owner.id().clone()),
                    status: Some(LendingStatus::Active),
                    ..Default::default()
                },
                &PageSelection::default(),
            )
            .await?;
        assert_eq!(filtered.total_items(), 1);

        let closed = PostgresLendingRecordRepository
            .close(
                &mut con,
                record.id(),
                &DamageReport::undamaged(),
                &ClosedAt::new(datetime!(2024-01-10 00:00 UTC)),
            )
            .await?;
        assert!(closed);

        // the guard holds: a closed record never transitions again
        let again = PostgresLendingRecordRepository
            .close(
                &mut con,
                record.id(),
                &DamageReport::new(true, Some("scuffed box".to_string())),
                &ClosedAt::new(datetime!(2024-01-11 00:00 UTC)),
            )
            .await?;
        assert!(!again);
        con.commit().await?;
        Ok(())
    }
}
