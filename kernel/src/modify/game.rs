use crate::database::Transaction;
use crate::entity::{Game, GameDraft};
use crate::KernelError;

#[async_trait::async_trait]
pub trait GameModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(
        &self,
        con: &mut Connection,
        draft: &GameDraft,
    ) -> error_stack::Result<Game, KernelError>;
}

pub trait DependOnGameModifier<Connection: Transaction>: 'static + Sync + Send {
    type GameModifier: GameModifier<Connection>;
    fn game_modifier(&self) -> &Self::GameModifier;
}
