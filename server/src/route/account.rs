mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::account::request::{CreateAccountRequest, Transformer};
use crate::route::account::response::{AccountResponse, Presenter};
use application::service::{CreateAccountService, GetAccountService};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

pub trait AccountRouter {
    fn route_account(self) -> Self;
}

impl AccountRouter for Router<AppModule> {
    fn route_account(self) -> Self {
        self.route(
            "/accounts",
            post(
                |State(module): State<AppModule>,
                 Json(req): Json<CreateAccountRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.pgpool().create_account(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/accounts/:id",
            get(|State(module): State<AppModule>, Path(id): Path<i64>| async move {
                Controller::new(Transformer, Presenter)
                    .intake(id)
                    .handle(|dto| async move { module.pgpool().get_account(dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                    .map(|res| {
                        res.map(AccountResponse::into_response)
                            .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                    })
            }),
        )
    }
}
