use crate::controller::Exhaust;
use application::transfer::{EventDto, RegistrationDto};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct EventResponse {
    id: i64,
    title: String,
    #[serde(with = "time::serde::rfc3339")]
    held_at: OffsetDateTime,
    location: String,
    description: String,
    max_participants: i32,
    registered_count: i64,
    host_id: i64,
    game_id: i64,
}

impl From<EventDto> for EventResponse {
    fn from(value: EventDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            held_at: value.held_at,
            location: value.location,
            description: value.description,
            max_participants: value.max_participants,
            registered_count: value.registered_count,
            host_id: value.host_id,
            game_id: value.game_id,
        }
    }
}

impl IntoResponse for EventResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    id: i64,
    event_id: i64,
    attendee_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    registered_at: OffsetDateTime,
}

impl From<RegistrationDto> for RegistrationResponse {
    fn from(value: RegistrationDto) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            attendee_id: value.attendee_id,
            registered_at: value.registered_at,
        }
    }
}

pub struct Presenter;

impl Exhaust<EventDto> for Presenter {
    type To = Json<EventResponse>;
    fn emit(&self, input: EventDto) -> Self::To {
        Json(EventResponse::from(input))
    }
}

impl Exhaust<Option<EventDto>> for Presenter {
    type To = Option<EventResponse>;
    fn emit(&self, input: Option<EventDto>) -> Self::To {
        input.map(EventResponse::from)
    }
}

impl Exhaust<RegistrationDto> for Presenter {
    type To = Json<RegistrationResponse>;
    fn emit(&self, input: RegistrationDto) -> Self::To {
        Json(RegistrationResponse::from(input))
    }
}

impl Exhaust<()> for Presenter {
    type To = ();
    fn emit(&self, input: ()) -> Self::To {
        input
    }
}
