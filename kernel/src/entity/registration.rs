mod id;

pub use self::id::*;
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

use crate::entity::{AccountId, CreatedAt, EventId};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct Registration {
    id: RegistrationId,
    event_id: EventId,
    attendee_id: AccountId,
    registered_at: CreatedAt<Registration>,
}

impl Registration {
    pub fn new(
        id: RegistrationId,
        event_id: EventId,
        attendee_id: AccountId,
        registered_at: CreatedAt<Registration>,
    ) -> Self {
        Self {
            id,
            event_id,
            attendee_id,
            registered_at,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct RegistrationDraft {
    event_id: EventId,
    attendee_id: AccountId,
    registered_at: CreatedAt<Registration>,
}

impl RegistrationDraft {
    pub fn new(
        event_id: EventId,
        attendee_id: AccountId,
        registered_at: CreatedAt<Registration>,
    ) -> Self {
        Self {
            event_id,
            attendee_id,
            registered_at,
        }
    }
}
