mod damage;
mod id;
mod status;

pub use self::{damage::*, id::*, status::*};
use destructure::{Destructure, Mutation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vodca::References;

use crate::entity::{AccountId, BorrowRequestId, ClosedAt, GameId, LoanPeriod};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure, Mutation)]
pub struct LendingRecord {
    id: LendingRecordId,
    request_id: BorrowRequestId,
    game_id: GameId,
    owner_id: AccountId,
    borrower_id: AccountId,
    period: LoanPeriod,
    status: LendingStatus,
    damage: Option<DamageReport>,
    closed_at: Option<ClosedAt>,
}

impl LendingRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LendingRecordId,
        request_id: BorrowRequestId,
        game_id: GameId,
        owner_id: AccountId,
        borrower_id: AccountId,
        period: LoanPeriod,
        status: LendingStatus,
        damage: Option<DamageReport>,
        closed_at: Option<ClosedAt>,
    ) -> Self {
        Self {
            id,
            request_id,
            game_id,
            owner_id,
            borrower_id,
            period,
            status,
            damage,
            closed_at,
        }
    }

    /// Derived, never stored: an ACTIVE record whose period has elapsed.
    pub fn is_overdue(&self, now: &OffsetDateTime) -> bool {
        self.status == LendingStatus::Active && self.period.ends_before(now)
    }
}

/// A record before the store has assigned its identity. Always stored ACTIVE
/// with no damage assessment.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct LendingRecordDraft {
    request_id: BorrowRequestId,
    game_id: GameId,
    owner_id: AccountId,
    borrower_id: AccountId,
    period: LoanPeriod,
}

impl LendingRecordDraft {
    pub fn new(
        request_id: BorrowRequestId,
        game_id: GameId,
        owner_id: AccountId,
        borrower_id: AccountId,
        period: LoanPeriod,
    ) -> Self {
        Self {
            request_id,
            game_id,
            owner_id,
            borrower_id,
            period,
        }
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use super::*;

    fn record(status: LendingStatus) -> LendingRecord {
        LendingRecord::new(
            LendingRecordId::new(1),
            BorrowRequestId::new(1),
            GameId::new(1),
            AccountId::new(1),
            AccountId::new(2),
            LoanPeriod::new(
                datetime!(2024-01-01 00:00 UTC),
                datetime!(2024-01-07 00:00 UTC),
            )
            .unwrap(),
            status,
            None,
            None,
        )
    }

    #[test]
    fn overdue_flips_with_now_and_nothing_else() {
        let active = record(LendingStatus::Active);
        assert!(!active.is_overdue(&datetime!(2024-01-05 00:00 UTC)));
        assert!(active.is_overdue(&datetime!(2024-01-10 00:00 UTC)));
        // same stored state, classification moved with the clock only
        assert!(!active.is_overdue(&datetime!(2024-01-07 00:00 UTC)));
    }

    #[test]
    fn only_active_records_read_as_overdue() {
        let late = datetime!(2024-01-10 00:00 UTC);
        for status in [
            LendingStatus::ReturnPending,
            LendingStatus::Disputed,
            LendingStatus::Closed,
        ] {
            assert!(!record(status).is_overdue(&late));
        }
    }
}
