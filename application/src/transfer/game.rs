use kernel::prelude::entity::{DestructGame, Game};

#[derive(Debug, Clone)]
pub struct GameDto {
    pub id: i64,
    pub title: String,
    pub owner_id: i64,
}

impl From<Game> for GameDto {
    fn from(value: Game) -> Self {
        let DestructGame {
            id,
            title,
            owner_id,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            owner_id: owner_id.into(),
        }
    }
}

pub struct CreateGameDto {
    pub title: String,
    pub owner_id: i64,
}

pub struct GetGameDto {
    pub id: i64,
}

pub struct GetGamesByOwnerDto {
    pub owner_id: i64,
}
