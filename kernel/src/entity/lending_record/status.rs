use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

/// Stored status of a lending record. OVERDUE is not here on purpose: it is
/// derived from an ACTIVE status and an elapsed period at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LendingStatus {
    Active,
    ReturnPending,
    Disputed,
    Closed,
}

impl LendingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LendingStatus::Active => "ACTIVE",
            LendingStatus::ReturnPending => "RETURN_PENDING",
            LendingStatus::Disputed => "DISPUTED",
            LendingStatus::Closed => "CLOSED",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, LendingStatus::Closed)
    }

    /// A dispute can be raised while the game is out or its return awaits
    /// confirmation; a settled dispute only resolves through close.
    pub fn accepts_dispute(&self) -> bool {
        matches!(self, LendingStatus::Active | LendingStatus::ReturnPending)
    }
}

impl FromStr for LendingStatus {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(LendingStatus::Active),
            "RETURN_PENDING" => Ok(LendingStatus::ReturnPending),
            "DISPUTED" => Ok(LendingStatus::Disputed),
            "CLOSED" => Ok(LendingStatus::Closed),
            other => Err(Report::new(KernelError::Dependency)
                .attach_printable(format!("unrecognized lending status: {other}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::LendingStatus::*;

    #[test]
    fn closed_is_terminal() {
        assert!(Closed.is_closed());
        assert!(!Closed.accepts_dispute());
    }

    #[test]
    fn dispute_window_covers_active_and_return_pending() {
        assert!(Active.accepts_dispute());
        assert!(ReturnPending.accepts_dispute());
        assert!(!Disputed.accepts_dispute());
    }
}
