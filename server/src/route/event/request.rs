use crate::controller::Intake;
use application::transfer::{
    CreateEventDto, GetEventDto, RegisterDto, ReviseEventDto, UnregisterDto,
};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct CreateEventBody {
    title: String,
    #[serde(with = "time::serde::rfc3339")]
    held_at: OffsetDateTime,
    location: String,
    description: String,
    max_participants: i32,
    host_id: i64,
    game_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviseEventBody {
    acting_account_id: i64,
    title: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    held_at: Option<OffsetDateTime>,
    location: Option<String>,
    description: Option<String>,
    max_participants: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    attendee_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PrincipalQuery {
    acting_account_id: i64,
}

pub struct Transformer;

impl Intake<CreateEventBody> for Transformer {
    type To = CreateEventDto;
    fn emit(&self, input: CreateEventBody) -> Self::To {
        Self::To {
            title: input.title,
            held_at: input.held_at,
            location: input.location,
            description: input.description,
            max_participants: input.max_participants,
            host_id: input.host_id,
            game_id: input.game_id,
        }
    }
}

impl Intake<(i64, ReviseEventBody)> for Transformer {
    type To = ReviseEventDto;
    fn emit(&self, (event_id, body): (i64, ReviseEventBody)) -> Self::To {
        Self::To {
            event_id,
            acting_account_id: body.acting_account_id,
            title: body.title,
            held_at: body.held_at,
            location: body.location,
            description: body.description,
            max_participants: body.max_participants,
        }
    }
}

impl Intake<i64> for Transformer {
    type To = GetEventDto;
    fn emit(&self, id: i64) -> Self::To {
        Self::To { id }
    }
}

impl Intake<(i64, RegisterBody)> for Transformer {
    type To = RegisterDto;
    fn emit(&self, (event_id, body): (i64, RegisterBody)) -> Self::To {
        Self::To {
            event_id,
            attendee_id: body.attendee_id,
        }
    }
}

impl Intake<(i64, PrincipalQuery)> for Transformer {
    type To = UnregisterDto;
    fn emit(&self, (registration_id, query): (i64, PrincipalQuery)) -> Self::To {
        Self::To {
            registration_id,
            acting_account_id: query.acting_account_id,
        }
    }
}
