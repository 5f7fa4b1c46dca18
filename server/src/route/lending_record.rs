mod request;
mod response;

pub use self::response::LendingRecordResponse;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::lending_record::request::{
    CloseRecordBody, PrincipalBody, RecordFilterQuery, Transformer,
};
use crate::route::lending_record::response::Presenter;
use application::service::{GetLendingRecordService, HandleLendingRecordService};
use application::transfer::GetLendingRecordDto;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::Query;

pub trait LendingRecordRouter {
    fn route_lending_record(self) -> Self;
}

impl LendingRecordRouter for Router<AppModule> {
    fn route_lending_record(self) -> Self {
        self.route(
            "/records",
            get(
                |State(module): State<AppModule>,
                 Query(req): Query<RecordFilterQuery>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.pgpool().list_records(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/records/overdue",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), Presenter)
                    .bypass(|| async { module.pgpool().overdue_records().await })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
        .route(
            "/records/:id",
            get(|State(module): State<AppModule>, Path(id): Path<i64>| async move {
                Controller::new(Transformer, Presenter)
                    .intake(id)
                    .handle(|dto: GetLendingRecordDto| async move {
                        module.pgpool().get_record(dto).await
                    })
                    .await
                    .map_err(ErrorStatus::from)
                    .map(|res| {
                        res.map(LendingRecordResponse::into_response)
                            .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                    })
            }),
        )
        .route(
            "/records/:id/return",
            post(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Json(req): Json<PrincipalBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().mark_returned(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/records/:id/dispute",
            post(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Json(req): Json<PrincipalBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().raise_dispute(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/records/:id/close",
            post(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Json(req): Json<CloseRecordBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().close_record(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
