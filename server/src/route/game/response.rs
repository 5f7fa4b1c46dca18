use crate::controller::Exhaust;
use application::transfer::GameDto;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GameResponse {
    id: i64,
    title: String,
    owner_id: i64,
}

impl From<GameDto> for GameResponse {
    fn from(value: GameDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            owner_id: value.owner_id,
        }
    }
}

impl IntoResponse for GameResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub struct Presenter;

impl Exhaust<GameDto> for Presenter {
    type To = Json<GameResponse>;
    fn emit(&self, input: GameDto) -> Self::To {
        Json(GameResponse::from(input))
    }
}

impl Exhaust<Option<GameDto>> for Presenter {
    type To = Option<GameResponse>;
    fn emit(&self, input: Option<GameDto>) -> Self::To {
        input.map(GameResponse::from)
    }
}

impl Exhaust<Vec<GameDto>> for Presenter {
    type To = Json<Vec<GameResponse>>;
    fn emit(&self, input: Vec<GameDto>) -> Self::To {
        Json(input.into_iter().map(GameResponse::from).collect())
    }
}
