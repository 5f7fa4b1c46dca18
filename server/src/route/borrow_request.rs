mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::borrow_request::request::{
    CreateRequestBody, ListRequestsQuery, PrincipalBody, PrincipalQuery, Transformer,
};
use crate::route::borrow_request::response::{
    BorrowRequestResponse, Presenter, RecordPresenter,
};
use application::service::{
    CreateBorrowRequestService, GetBorrowRequestService, HandleBorrowRequestService,
};
use application::transfer::GetBorrowRequestDto;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

pub trait BorrowRequestRouter {
    fn route_borrow_request(self) -> Self;
}

impl BorrowRequestRouter for Router<AppModule> {
    fn route_borrow_request(self) -> Self {
        self.route(
            "/requests",
            post(
                |State(module): State<AppModule>,
                 Json(req): Json<CreateRequestBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.pgpool().create_request(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .get(
                |State(module): State<AppModule>,
                 Query(req): Query<ListRequestsQuery>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|selector| async move {
                            match selector {
                                request::ListSelector::ByRequester(dto) => {
                                    module.pgpool().requests_by_requester(dto).await
                                }
                                request::ListSelector::ByStatus(dto) => {
                                    module.pgpool().requests_by_status(dto).await
                                }
                                request::ListSelector::Unspecified => Err(
                                    error_stack::Report::new(kernel::KernelError::Validation)
                                        .attach_printable(
                                            "filter by requester_id or status",
                                        ),
                                ),
                            }
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/requests/:id",
            get(|State(module): State<AppModule>, Path(id): Path<i64>| async move {
                Controller::new(Transformer, Presenter)
                    .intake(id)
                    .handle(|dto: GetBorrowRequestDto| async move {
                        module.pgpool().get_request(dto).await
                    })
                    .await
                    .map_err(ErrorStatus::from)
                    .map(|res| {
                        res.map(BorrowRequestResponse::into_response)
                            .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                    })
            })
            .delete(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Query(req): Query<PrincipalQuery>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().withdraw(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/requests/:id/approve",
            post(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Json(req): Json<PrincipalBody>| async move {
                    Controller::new(Transformer, RecordPresenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().approve(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/requests/:id/decline",
            post(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Json(req): Json<PrincipalBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().decline(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
