mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::game::request::{CreateGameRequest, OwnedGamesQuery, Transformer};
use crate::route::game::response::{GameResponse, Presenter};
use application::service::{CreateGameService, GetGameService};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

pub trait GameRouter {
    fn route_game(self) -> Self;
}

impl GameRouter for Router<AppModule> {
    fn route_game(self) -> Self {
        self.route(
            "/games",
            post(
                |State(module): State<AppModule>, Json(req): Json<CreateGameRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.pgpool().create_game(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .get(
                |State(module): State<AppModule>, Query(req): Query<OwnedGamesQuery>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.pgpool().games_by_owner(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/games/:id",
            get(|State(module): State<AppModule>, Path(id): Path<i64>| async move {
                Controller::new(Transformer, Presenter)
                    .intake(id)
                    .handle(|dto| async move { module.pgpool().get_game(dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                    .map(|res| {
                        res.map(GameResponse::into_response)
                            .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                    })
            }),
        )
    }
}
