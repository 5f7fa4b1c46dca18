use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowRequestStatus {
    Pending,
    Approved,
    Declined,
}

impl BorrowRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowRequestStatus::Pending => "PENDING",
            BorrowRequestStatus::Approved => "APPROVED",
            BorrowRequestStatus::Declined => "DECLINED",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, BorrowRequestStatus::Pending)
    }

    /// The only legal moves: PENDING -> APPROVED and PENDING -> DECLINED.
    pub fn can_become(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (BorrowRequestStatus::Pending, BorrowRequestStatus::Approved)
                | (BorrowRequestStatus::Pending, BorrowRequestStatus::Declined)
        )
    }
}

impl FromStr for BorrowRequestStatus {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BorrowRequestStatus::Pending),
            "APPROVED" => Ok(BorrowRequestStatus::Approved),
            "DECLINED" => Ok(BorrowRequestStatus::Declined),
            other => Err(Report::new(KernelError::Dependency)
                .attach_printable(format!("unrecognized borrow request status: {other}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::BorrowRequestStatus::*;

    #[test]
    fn pending_reaches_exactly_approved_and_declined() {
        assert!(Pending.can_become(&Approved));
        assert!(Pending.can_become(&Declined));
        assert!(!Pending.can_become(&Pending));
    }

    #[test]
    fn nothing_reaches_pending_again() {
        for settled in [Approved, Declined] {
            assert!(!settled.can_become(&Pending));
            assert!(!settled.can_become(&Approved));
            assert!(!settled.can_become(&Declined));
        }
    }
}
