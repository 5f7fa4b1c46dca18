mod capacity;
mod held_at;
mod id;
mod location;
mod title;

pub use self::{capacity::*, held_at::*, id::*, location::*, title::*};
use destructure::{Destructure, Mutation};
use serde::{Deserialize, Serialize};
use vodca::References;

use crate::entity::{AccountId, GameId};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure, Mutation)]
pub struct Event {
    id: EventId,
    title: EventTitle,
    held_at: HeldAt,
    location: EventLocation,
    description: EventDescription,
    capacity: EventCapacity,
    host_id: AccountId,
    game_id: GameId,
}

impl Event {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EventId,
        title: EventTitle,
        held_at: HeldAt,
        location: EventLocation,
        description: EventDescription,
        capacity: EventCapacity,
        host_id: AccountId,
        game_id: GameId,
    ) -> Self {
        Self {
            id,
            title,
            held_at,
            location,
            description,
            capacity,
            host_id,
            game_id,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct EventDraft {
    title: EventTitle,
    held_at: HeldAt,
    location: EventLocation,
    description: EventDescription,
    capacity: EventCapacity,
    host_id: AccountId,
    game_id: GameId,
}

impl EventDraft {
    pub fn new(
        title: EventTitle,
        held_at: HeldAt,
        location: EventLocation,
        description: EventDescription,
        capacity: EventCapacity,
        host_id: AccountId,
        game_id: GameId,
    ) -> Self {
        Self {
            title,
            held_at,
            location,
            description,
            capacity,
            host_id,
            game_id,
        }
    }
}

/// Host-requested changes; absent fields keep their stored value. A smaller
/// capacity only applies while it still covers every existing registration.
#[derive(Debug, Clone, Eq, PartialEq, Default, References, Destructure)]
pub struct EventRevision {
    title: Option<EventTitle>,
    held_at: Option<HeldAt>,
    location: Option<EventLocation>,
    description: Option<EventDescription>,
    capacity: Option<EventCapacity>,
}

impl EventRevision {
    pub fn new(
        title: Option<EventTitle>,
        held_at: Option<HeldAt>,
        location: Option<EventLocation>,
        description: Option<EventDescription>,
        capacity: Option<EventCapacity>,
    ) -> Self {
        Self {
            title,
            held_at,
            location,
            description,
            capacity,
        }
    }
}
