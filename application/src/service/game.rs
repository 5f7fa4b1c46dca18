use error_stack::Report;

use kernel::interface::database::{
    DatabaseConnection, DependOnDatabaseConnection, Transaction,
};
use kernel::interface::query::{DependOnAccountQuery, DependOnGameQuery, GameQuery};
use kernel::interface::update::{DependOnGameModifier, GameModifier};
use kernel::prelude::entity::{AccountId, AccountRole, GameDraft, GameId, GameTitle};
use kernel::KernelError;

use crate::service::resolve_account;
use crate::transfer::{CreateGameDto, GameDto, GetGameDto, GetGamesByOwnerDto};

#[async_trait::async_trait]
pub trait CreateGameService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnAccountQuery<Connection>
    + DependOnGameModifier<Connection>
{
    async fn create_game(&self, dto: CreateGameDto) -> error_stack::Result<GameDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let owner =
            resolve_account(self.account_query(), &mut connection, dto.owner_id, "owner").await?;
        if owner.role() != &AccountRole::GameOwner {
            return Err(Report::new(KernelError::Forbidden)
                .attach_printable("only game-owner accounts can offer games"));
        }

        let draft = GameDraft::new(GameTitle::new(dto.title), owner.id().clone());
        let game = self.game_modifier().create(&mut connection, &draft).await?;
        connection.commit().await?;

        Ok(GameDto::from(game))
    }
}

impl<Connection: Transaction + Send, T> CreateGameService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnAccountQuery<Connection>
        + DependOnGameModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait GetGameService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnGameQuery<Connection>
{
    async fn get_game(&self, dto: GetGameDto) -> error_stack::Result<Option<GameDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let game = self
            .game_query()
            .find_by_id(&mut connection, &GameId::new(dto.id))
            .await?;
        Ok(game.map(GameDto::from))
    }

    async fn games_by_owner(
        &self,
        dto: GetGamesByOwnerDto,
    ) -> error_stack::Result<Vec<GameDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let games = self
            .game_query()
            .find_by_owner(&mut connection, &AccountId::new(dto.owner_id))
            .await?;
        Ok(games.into_iter().map(GameDto::from).collect())
    }
}

impl<Connection: Transaction + Send, T> GetGameService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnGameQuery<Connection>
{
}
