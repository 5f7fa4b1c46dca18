use crate::database::Transaction;
use crate::entity::{AccountId, Game, GameId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait GameQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &GameId,
    ) -> error_stack::Result<Option<Game>, KernelError>;

    async fn find_by_owner(
        &self,
        con: &mut Connection,
        owner_id: &AccountId,
    ) -> error_stack::Result<Vec<Game>, KernelError>;
}

pub trait DependOnGameQuery<Connection: Transaction>: Sync + Send + 'static {
    type GameQuery: GameQuery<Connection>;
    fn game_query(&self) -> &Self::GameQuery;
}
