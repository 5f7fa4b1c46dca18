mod id;
mod status;

pub use self::{id::*, status::*};
use destructure::{Destructure, Mutation};
use serde::{Deserialize, Serialize};
use vodca::References;

use crate::entity::{AccountId, CreatedAt, GameId, LoanPeriod};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure, Mutation)]
pub struct BorrowRequest {
    id: BorrowRequestId,
    requester_id: AccountId,
    game_id: GameId,
    period: LoanPeriod,
    status: BorrowRequestStatus,
    requested_at: CreatedAt<BorrowRequest>,
}

impl BorrowRequest {
    pub fn new(
        id: BorrowRequestId,
        requester_id: AccountId,
        game_id: GameId,
        period: LoanPeriod,
        status: BorrowRequestStatus,
        requested_at: CreatedAt<BorrowRequest>,
    ) -> Self {
        Self {
            id,
            requester_id,
            game_id,
            period,
            status,
            requested_at,
        }
    }
}

/// A request before the store has assigned its identity. Always stored
/// PENDING.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct BorrowRequestDraft {
    requester_id: AccountId,
    game_id: GameId,
    period: LoanPeriod,
    requested_at: CreatedAt<BorrowRequest>,
}

impl BorrowRequestDraft {
    pub fn new(
        requester_id: AccountId,
        game_id: GameId,
        period: LoanPeriod,
        requested_at: CreatedAt<BorrowRequest>,
    ) -> Self {
        Self {
            requester_id,
            game_id,
            period,
            requested_at,
        }
    }
}
