use time::OffsetDateTime;

use kernel::prelude::entity::{DestructEvent, DestructRegistration, Event, Registration};

#[derive(Debug, Clone)]
pub struct EventDto {
    pub id: i64,
    pub title: String,
    pub held_at: OffsetDateTime,
    pub location: String,
    pub description: String,
    pub max_participants: i32,
    pub registered_count: i64,
    pub host_id: i64,
    pub game_id: i64,
}

impl EventDto {
    pub fn project(event: Event, registered_count: i64) -> Self {
        let DestructEvent {
            id,
            title,
            held_at,
            location,
            description,
            capacity,
            host_id,
            game_id,
        } = event.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            held_at: *held_at.as_ref(),
            location: location.into(),
            description: description.into(),
            max_participants: capacity.into(),
            registered_count,
            host_id: host_id.into(),
            game_id: game_id.into(),
        }
    }
}

pub struct CreateEventDto {
    pub title: String,
    pub held_at: OffsetDateTime,
    pub location: String,
    pub description: String,
    pub max_participants: i32,
    pub host_id: i64,
    pub game_id: i64,
}

pub struct ReviseEventDto {
    pub event_id: i64,
    pub acting_account_id: i64,
    pub title: Option<String>,
    pub held_at: Option<OffsetDateTime>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub max_participants: Option<i32>,
}

pub struct GetEventDto {
    pub id: i64,
}

#[derive(Debug, Clone)]
pub struct RegistrationDto {
    pub id: i64,
    pub event_id: i64,
    pub attendee_id: i64,
    pub registered_at: OffsetDateTime,
}

impl From<Registration> for RegistrationDto {
    fn from(value: Registration) -> Self {
        let DestructRegistration {
            id,
            event_id,
            attendee_id,
            registered_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            event_id: event_id.into(),
            attendee_id: attendee_id.into(),
            registered_at: *registered_at.as_ref(),
        }
    }
}

pub struct RegisterDto {
    pub event_id: i64,
    pub attendee_id: i64,
}

pub struct UnregisterDto {
    pub registration_id: i64,
    pub acting_account_id: i64,
}
