use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

/// Capability flag on an account. A single entity carries it; there is no
/// owner subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    User,
    GameOwner,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::User => "USER",
            AccountRole::GameOwner => "GAME_OWNER",
        }
    }
}

impl FromStr for AccountRole {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(AccountRole::User),
            "GAME_OWNER" => Ok(AccountRole::GameOwner),
            other => Err(Report::new(KernelError::Dependency)
                .attach_printable(format!("unrecognized account role: {other}"))),
        }
    }
}
