use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct EventLocation(String);

impl EventLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct EventDescription(String);

impl EventDescription {
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }
}
