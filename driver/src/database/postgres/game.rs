use sqlx::PgConnection;

use kernel::interface::query::{DependOnGameQuery, GameQuery};
use kernel::interface::update::{DependOnGameModifier, GameModifier};
use kernel::prelude::entity::{AccountId, Game, GameDraft, GameId, GameTitle};
use kernel::KernelError;

use crate::database::postgres::{PgTransaction, PostgresDatabase};
use crate::error::ConvertError;

pub struct PostgresGameRepository;

#[async_trait::async_trait]
impl GameQuery<PgTransaction> for PostgresGameRepository {
    async fn find_by_id(
        &self,
        con: &mut PgTransaction,
        id: &GameId,
    ) -> error_stack::Result<Option<Game>, KernelError> {
        PgGameInternal::find_by_id(con.as_conn(), id).await
    }

    async fn find_by_owner(
        &self,
        con: &mut PgTransaction,
        owner_id: &AccountId,
    ) -> error_stack::Result<Vec<Game>, KernelError> {
        PgGameInternal::find_by_owner(con.as_conn(), owner_id).await
    }
}

#[async_trait::async_trait]
impl GameModifier<PgTransaction> for PostgresGameRepository {
    async fn create(
        &self,
        con: &mut PgTransaction,
        draft: &GameDraft,
    ) -> error_stack::Result<Game, KernelError> {
        PgGameInternal::create(con.as_conn(), draft).await
    }
}

impl DependOnGameQuery<PgTransaction> for PostgresDatabase {
    type GameQuery = PostgresGameRepository;
    fn game_query(&self) -> &Self::GameQuery {
        &PostgresGameRepository
    }
}

impl DependOnGameModifier<PgTransaction> for PostgresDatabase {
    type GameModifier = PostgresGameRepository;
    fn game_modifier(&self) -> &Self::GameModifier {
        &PostgresGameRepository
    }
}

#[derive(sqlx::FromRow)]
struct GameRow {
    id: i64,
    title: String,
    owner_id: i64,
}

impl From<GameRow> for Game {
    fn from(value: GameRow) -> Self {
        Game::new(
            GameId::new(value.id),
            GameTitle::new(value.title),
            AccountId::new(value.owner_id),
        )
    }
}

pub(in crate::database) struct PgGameInternal;

impl PgGameInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &GameId,
    ) -> error_stack::Result<Option<Game>, KernelError> {
        let row = sqlx::query_as::<_, GameRow>(
            // language=postgresql
            r#"
            SELECT id, title, owner_id
            FROM games
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Game::from))
    }

    async fn find_by_owner(
        con: &mut PgConnection,
        owner_id: &AccountId,
    ) -> error_stack::Result<Vec<Game>, KernelError> {
        let rows = sqlx::query_as::<_, GameRow>(
            // language=postgresql
            r#"
            SELECT id, title, owner_id
            FROM games
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Game::from).collect())
    }

    async fn create(
        con: &mut PgConnection,
        draft: &GameDraft,
    ) -> error_stack::Result<Game, KernelError> {
        let row = sqlx::query_as::<_, GameRow>(
            // language=postgresql
            r#"
            INSERT INTO games (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id
            "#,
        )
        .bind(draft.title().as_ref())
        .bind(draft.owner_id().as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(Game::from(row))
    }
}
