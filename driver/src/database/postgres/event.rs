use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::{DependOnEventQuery, EventQuery};
use kernel::interface::update::{DependOnEventModifier, EventModifier};
use kernel::prelude::entity::{
    AccountId, Event, EventCapacity, EventDescription, EventDraft, EventId, EventLocation,
    EventRevision, EventTitle, GameId, HeldAt,
};
use kernel::KernelError;

use crate::database::postgres::{PgTransaction, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresEventRepository;

#[async_trait::async_trait]
impl EventQuery<PgTransaction> for PostgresEventRepository {
    async fn find_by_id(
        &self,
        con: &mut PgTransaction,
        id: &EventId,
    ) -> error_stack::Result<Option<Event>, KernelError> {
        PgEventInternal::find_by_id(con.as_conn(), id).await
    }

    async fn registered_count(
        &self,
        con: &mut PgTransaction,
        id: &EventId,
    ) -> error_stack::Result<i64, KernelError> {
        PgEventInternal::registered_count(con.as_conn(), id).await
    }
}

#[async_trait::async_trait]
impl EventModifier<PgTransaction> for PostgresEventRepository {
    async fn create(
        &self,
        con: &mut PgTransaction,
        draft: &EventDraft,
    ) -> error_stack::Result<Event, KernelError> {
        PgEventInternal::create(con.as_conn(), draft).await
    }

    async fn revise(
        &self,
        con: &mut PgTransaction,
        id: &EventId,
        revision: &EventRevision,
    ) -> error_stack::Result<bool, KernelError> {
        PgEventInternal::revise(con.as_conn(), id, revision).await
    }
}

impl DependOnEventQuery<PgTransaction> for PostgresDatabase {
    type EventQuery = PostgresEventRepository;
    fn event_query(&self) -> &Self::EventQuery {
        &PostgresEventRepository
    }
}

impl DependOnEventModifier<PgTransaction> for PostgresDatabase {
    type EventModifier = PostgresEventRepository;
    fn event_modifier(&self) -> &Self::EventModifier {
        &PostgresEventRepository
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    title: String,
    held_at: OffsetDateTime,
    location: String,
    description: String,
    max_participants: i32,
    host_id: i64,
    game_id: i64,
}

impl TryFrom<EventRow> for Event {
    type Error = error_stack::Report<KernelError>;

    fn try_from(value: EventRow) -> Result<Self, Self::Error> {
        Ok(Event::new(
            EventId::new(value.id),
            EventTitle::new(value.title),
            HeldAt::new(value.held_at),
            EventLocation::new(value.location),
            EventDescription::new(value.description),
            EventCapacity::new(value.max_participants)?,
            AccountId::new(value.host_id),
            GameId::new(value.game_id),
        ))
    }
}

pub(in crate::database) struct PgEventInternal;

impl PgEventInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &EventId,
    ) -> error_stack::Result<Option<Event>, KernelError> {
        let row = sqlx::query_as::<_, EventRow>(
            // language=postgresql
            r#"
            SELECT id, title, held_at, location, description, max_participants, host_id, game_id
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Event::try_from).transpose()
    }

    async fn registered_count(
        con: &mut PgConnection,
        id: &EventId,
    ) -> error_stack::Result<i64, KernelError> {
        sqlx::query_scalar(
            // language=postgresql
            r#"
            SELECT COUNT(*)
            FROM event_registrations
            WHERE event_id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_one(con)
        .await
        .convert_error()
    }

    async fn create(
        con: &mut PgConnection,
        draft: &EventDraft,
    ) -> error_stack::Result<Event, KernelError> {
        let row = sqlx::query_as::<_, EventRow>(
            // language=postgresql
            r#"
            INSERT INTO events (title, held_at, location, description, max_participants, host_id, game_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, held_at, location, description, max_participants, host_id, game_id
            "#,
        )
        .bind(draft.title().as_ref())
        .bind(draft.held_at().as_ref())
        .bind(draft.location().as_ref())
        .bind(draft.description().as_ref())
        .bind(draft.capacity().as_ref())
        .bind(draft.host_id().as_ref())
        .bind(draft.game_id().as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Event::try_from(row)
    }

    async fn revise(
        con: &mut PgConnection,
        id: &EventId,
        revision: &EventRevision,
    ) -> error_stack::Result<bool, KernelError> {
        let capacity = revision.capacity().as_ref().map(|value| *value.as_ref());
        let result = sqlx::query(
            // language=postgresql
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                held_at = COALESCE($3, held_at),
                location = COALESCE($4, location),
                description = COALESCE($5, description),
                max_participants = COALESCE($6, max_participants)
            WHERE id = $1
              AND ($6::int IS NULL
                   OR $6 >= (SELECT COUNT(*) FROM event_registrations WHERE event_id = $1))
            "#,
        )
        .bind(id.as_ref())
        .bind(revision.title().as_ref().map(|title| title.as_ref().as_str()))
        .bind(revision.held_at().as_ref().map(|held| *held.as_ref()))
        .bind(
            revision
                .location()
                .as_ref()
                .map(|location| location.as_ref().as_str()),
        )
        .bind(
            revision
                .description()
                .as_ref()
                .map(|description| description.as_ref().as_str()),
        )
        .bind(capacity)
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() == 1)
    }
}
