use crate::controller::Intake;
use application::transfer::{CreateGameDto, GetGameDto, GetGamesByOwnerDto};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    title: String,
    owner_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct OwnedGamesQuery {
    owner_id: i64,
}

pub struct Transformer;

impl Intake<CreateGameRequest> for Transformer {
    type To = CreateGameDto;
    fn emit(&self, CreateGameRequest { title, owner_id }: CreateGameRequest) -> Self::To {
        Self::To { title, owner_id }
    }
}

impl Intake<OwnedGamesQuery> for Transformer {
    type To = GetGamesByOwnerDto;
    fn emit(&self, OwnedGamesQuery { owner_id }: OwnedGamesQuery) -> Self::To {
        Self::To { owner_id }
    }
}

impl Intake<i64> for Transformer {
    type To = GetGameDto;
    fn emit(&self, id: i64) -> Self::To {
        Self::To { id }
    }
}
