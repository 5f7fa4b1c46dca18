use time::OffsetDateTime;

use kernel::prelude::entity::{BorrowRequest, BorrowRequestStatus, DestructBorrowRequest};

#[derive(Debug, Clone)]
pub struct BorrowRequestDto {
    pub id: i64,
    pub requester_id: i64,
    pub game_id: i64,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub status: String,
    pub requested_at: OffsetDateTime,
}

impl From<BorrowRequest> for BorrowRequestDto {
    fn from(value: BorrowRequest) -> Self {
        let DestructBorrowRequest {
            id,
            requester_id,
            game_id,
            period,
            status,
            requested_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            requester_id: requester_id.into(),
            game_id: game_id.into(),
            start_date: *period.start(),
            end_date: *period.end(),
            status: status.as_str().to_string(),
            requested_at: *requested_at.as_ref(),
        }
    }
}

pub struct CreateBorrowRequestDto {
    pub requester_id: i64,
    pub game_id: i64,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
}

/// Approve, decline and withdraw all act on a request id on behalf of a
/// principal.
pub struct BorrowRequestActionDto {
    pub request_id: i64,
    pub acting_account_id: i64,
}

pub struct GetBorrowRequestDto {
    pub id: i64,
}

pub struct GetRequestsByRequesterDto {
    pub requester_id: i64,
}

pub struct GetRequestsByStatusDto {
    pub status: BorrowRequestStatus,
}
