use error_stack::Report;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::{DependOnRegistrationQuery, RegistrationQuery};
use kernel::interface::update::{DependOnRegistrationModifier, RegistrationModifier};
use kernel::prelude::entity::{
    AccountId, CreatedAt, EventId, Registration, RegistrationDraft, RegistrationId,
};
use kernel::KernelError;

use crate::database::postgres::{PgTransaction, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresRegistrationRepository;

#[async_trait::async_trait]
impl RegistrationQuery<PgTransaction> for PostgresRegistrationRepository {
    async fn find_by_id(
        &self,
        con: &mut PgTransaction,
        id: &RegistrationId,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        PgRegistrationInternal::find_by_id(con.as_conn(), id).await
    }

    async fn find_by_event(
        &self,
        con: &mut PgTransaction,
        event_id: &EventId,
    ) -> error_stack::Result<Vec<Registration>, KernelError> {
        PgRegistrationInternal::find_by_event(con.as_conn(), event_id).await
    }

    async fn find_by_event_and_attendee(
        &self,
        con: &mut PgTransaction,
        event_id: &EventId,
        attendee_id: &AccountId,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        PgRegistrationInternal::find_by_event_and_attendee(con.as_conn(), event_id, attendee_id)
            .await
    }
}

#[async_trait::async_trait]
impl RegistrationModifier<PgTransaction> for PostgresRegistrationRepository {
    async fn create_within_capacity(
        &self,
        con: &mut PgTransaction,
        draft: &RegistrationDraft,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        PgRegistrationInternal::create_within_capacity(con.as_conn(), draft).await
    }

    async fn delete(
        &self,
        con: &mut PgTransaction,
        id: &RegistrationId,
    ) -> error_stack::Result<bool, KernelError> {
        PgRegistrationInternal::delete(con.as_conn(), id).await
    }
}

impl DependOnRegistrationQuery<PgTransaction> for PostgresDatabase {
    type RegistrationQuery = PostgresRegistrationRepository;
    fn registration_query(&self) -> &Self::RegistrationQuery {
        &PostgresRegistrationRepository
    }
}

impl DependOnRegistrationModifier<PgTransaction> for PostgresDatabase {
    type RegistrationModifier = PostgresRegistrationRepository;
    fn registration_modifier(&self) -> &Self::RegistrationModifier {
        &PostgresRegistrationRepository
    }
}

#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: i64,
    event_id: i64,
    attendee_id: i64,
    registered_at: OffsetDateTime,
}

impl From<RegistrationRow> for Registration {
    fn from(value: RegistrationRow) -> Self {
        Registration::new(
            RegistrationId::new(value.id),
            EventId::new(value.event_id),
            AccountId::new(value.attendee_id),
            CreatedAt::new(value.registered_at),
        )
    }
}

pub(in crate::database) struct PgRegistrationInternal;

impl PgRegistrationInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &RegistrationId,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            // language=postgresql
            r#"
            SELECT id, event_id, attendee_id, registered_at
            FROM event_registrations
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Registration::from))
    }

    async fn find_by_event(
        con: &mut PgConnection,
        event_id: &EventId,
    ) -> error_stack::Result<Vec<Registration>, KernelError> {
        let rows = sqlx::query_as::<_, RegistrationRow>(
            // language=postgresql
            r#"
            SELECT id, event_id, attendee_id, registered_at
            FROM event_registrations
            WHERE event_id = $1
            ORDER BY id
            "#,
        )
        .bind(event_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }

    async fn find_by_event_and_attendee(
        con: &mut PgConnection,
        event_id: &EventId,
        attendee_id: &AccountId,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            // language=postgresql
            r#"
            SELECT id, event_id, attendee_id, registered_at
            FROM event_registrations
            WHERE event_id = $1 AND attendee_id = $2
            "#,
        )
        .bind(event_id.as_ref())
        .bind(attendee_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Registration::from))
    }

    async fn create_within_capacity(
        con: &mut PgConnection,
        draft: &RegistrationDraft,
    ) -> error_stack::Result<Option<Registration>, KernelError> {
        // lock the event row so concurrent registrations serialize here
        let capacity: Option<i32> = sqlx::query_scalar(
            // language=postgresql
            r#"
            SELECT max_participants
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(draft.event_id().as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        let Some(capacity) = capacity else {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable("event to register for does not exist"));
        };

        let registered: i64 = sqlx::query_scalar(
            // language=postgresql
            r#"
            SELECT COUNT(*)
            FROM event_registrations
            WHERE event_id = $1
            "#,
        )
        .bind(draft.event_id().as_ref())
        .fetch_one(&mut *con)
        .await
        .convert_error()?;
        if registered >= i64::from(capacity) {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, RegistrationRow>(
            // language=postgresql
            r#"
            INSERT INTO event_registrations (event_id, attendee_id, registered_at)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, attendee_id, registered_at
            "#,
        )
        .bind(draft.event_id().as_ref())
        .bind(draft.attendee_id().as_ref())
        .bind(draft.registered_at().as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(Some(Registration::from(row)))
    }

    async fn delete(
        con: &mut PgConnection,
        id: &RegistrationId,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM event_registrations
            WHERE id = $1
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
    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::update::{
        AccountModifier, EventModifier, GameModifier, RegistrationModifier,
    };
    use kernel::prelude::entity::{
        AccountDraft, AccountName, AccountRole, CreatedAt, EventCapacity, EventDescription,
        EventDraft, EventLocation, EventTitle, GameDraft, GameTitle, HeldAt, RegistrationDraft,
    };
    use kernel::KernelError;
    use time::macros::datetime;

    use crate::database::postgres::{
        PostgresAccountRepository, PostgresDatabase, PostgresEventRepository,
        PostgresGameRepository, PostgresRegistrationRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;

        let mut con = db.transact().await?;
        let host = PostgresAccountRepository
            .create(
                &mut con,
                &AccountDraft::new(
                    AccountName::new(format!("host-{}", rand::random::<u32>())),
                    AccountRole::GameOwner,
                ),
            )
            .await?;
        let first = PostgresAccountRepository
            .create(
                &mut con,
                &AccountDraft::new(
                    AccountName::new(format!("first-{}", rand::random::<u32>())),
                    AccountRole::User,
                ),
            )
            .await?;
        let second = PostgresAccountRepository
            .create(
                &mut con,
                &AccountDraft::new(
                    AccountName::new(format!("second-{}", rand::random::<u32>())),
                    AccountRole::User,
                ),
            )
            .await?;
        let game = PostgresGameRepository
            .create(
                &mut con,
                &GameDraft::new(GameTitle::new("Cascadia"), host.id().clone()),
            )
            .await?;
        let event = PostgresEventRepository
            .create(
                &mut con,
                &EventDraft::new(
                    EventTitle::new("Tile-laying night"),
                    HeldAt::new(datetime!(2024-03-01 18:00 UTC)),
                    EventLocation::new("Community hall"),
                    EventDescription::new("Casual round, newcomers welcome"),
                    EventCapacity::new(1)?,
                    host.id().clone(),
                    game.id().clone(),
                ),
            )
            .await?;

        let seat = PostgresRegistrationRepository
            .create_within_capacity(
                &mut con,
                &RegistrationDraft::new(
                    event.id().clone(),
                    first.id().clone(),
                    CreatedAt::new(datetime!(2024-02-01 09:00 UTC)),
                ),
            )
            .await?
            .expect("first registration must fit");

        // the capacity guard refuses the second seat without writing
        let full = PostgresRegistrationRepository
            .create_within_capacity(
                &mut con,
                &RegistrationDraft::new(
                    event.id().clone(),
                    second.id().clone(),
                    CreatedAt::new(datetime!(2024-02-01 10:00 UTC)),
                ),
            )
            .await?;
        assert!(full.is_none());

        // freeing the seat lets the other attendee in
        let freed = PostgresRegistrationRepository.delete(&mut con, seat.id()).await?;
        assert!(freed);
        let taken = PostgresRegistrationRepository
            .create_within_capacity(
                &mut con,
                &RegistrationDraft::new(
                    event.id().clone(),
                    second.id().clone(),
                    CreatedAt::new(datetime!(2024-02-01 11:00 UTC)),
                ),
            )
            .await?;
        assert!(taken.is_some());
        con.roll_back().await?;
        Ok(())
    }
}
