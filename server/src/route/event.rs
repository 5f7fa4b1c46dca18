mod request;
mod response;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::event::request::{
    CreateEventBody, PrincipalQuery, RegisterBody, ReviseEventBody, Transformer,
};
use crate::route::event::response::{EventResponse, Presenter};
use application::service::{GetEventService, HandleEventService, HandleRegistrationService};
use application::transfer::GetEventDto;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

pub trait EventRouter {
    fn route_event(self) -> Self;
}

impl EventRouter for Router<AppModule> {
    fn route_event(self) -> Self {
        self.route(
            "/events",
            post(
                |State(module): State<AppModule>, Json(req): Json<CreateEventBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.pgpool().create_event(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/events/:id",
            get(|State(module): State<AppModule>, Path(id): Path<i64>| async move {
                Controller::new(Transformer, Presenter)
                    .intake(id)
                    .handle(|dto: GetEventDto| async move { module.pgpool().get_event(dto).await })
                    .await
                    .map_err(ErrorStatus::from)
                    .map(|res| {
                        res.map(EventResponse::into_response)
                            .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                    })
            })
            .patch(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Json(req): Json<ReviseEventBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().revise_event(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/events/:id/registrations",
            post(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Json(req): Json<RegisterBody>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().register(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/registrations/:id",
            delete(
                |State(module): State<AppModule>,
                 Path(id): Path<i64>,
                 Query(req): Query<PrincipalQuery>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.pgpool().unregister(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
