mod id;
mod title;

pub use self::{id::*, title::*};
use destructure::{Destructure, Mutation};
use serde::{Deserialize, Serialize};
use vodca::References;

use crate::entity::AccountId;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure, Mutation)]
pub struct Game {
    id: GameId,
    title: GameTitle,
    owner_id: AccountId,
}

impl Game {
    pub fn new(id: GameId, title: GameTitle, owner_id: AccountId) -> Self {
        Self {
            id,
            title,
            owner_id,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Destructure, References)]
pub struct GameDraft {
    title: GameTitle,
    owner_id: AccountId,
}

impl GameDraft {
    pub fn new(title: GameTitle, owner_id: AccountId) -> Self {
        Self { title, owner_id }
    }
}
