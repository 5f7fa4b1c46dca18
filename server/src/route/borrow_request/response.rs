use crate::controller::Exhaust;
use crate::route::lending_record::LendingRecordResponse;
use application::transfer::{BorrowRequestDto, LendingRecordDto};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct BorrowRequestResponse {
    id: i64,
    requester_id: i64,
    game_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end_date: OffsetDateTime,
    status: String,
    #[serde(with = "time::serde::rfc3339")]
    requested_at: OffsetDateTime,
}

impl From<BorrowRequestDto> for BorrowRequestResponse {
    fn from(value: BorrowRequestDto) -> Self {
        Self {
            id: value.id,
            requester_id: value.requester_id,
            game_id: value.game_id,
            start_date: value.start_date,
            end_date: value.end_date,
            status: value.status,
            requested_at: value.requested_at,
        }
    }
}

impl IntoResponse for BorrowRequestResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub struct Presenter;

impl Exhaust<BorrowRequestDto> for Presenter {
    type To = Json<BorrowRequestResponse>;
    fn emit(&self, input: BorrowRequestDto) -> Self::To {
        Json(BorrowRequestResponse::from(input))
    }
}

impl Exhaust<Option<BorrowRequestDto>> for Presenter {
    type To = Option<BorrowRequestResponse>;
    fn emit(&self, input: Option<BorrowRequestDto>) -> Self::To {
        input.map(BorrowRequestResponse::from)
    }
}

impl Exhaust<Vec<BorrowRequestDto>> for Presenter {
    type To = Json<Vec<BorrowRequestResponse>>;
    fn emit(&self, input: Vec<BorrowRequestDto>) -> Self::To {
        Json(input.into_iter().map(BorrowRequestResponse::from).collect())
    }
}

impl Exhaust<()> for Presenter {
    type To = ();
    fn emit(&self, input: ()) -> Self::To {
        input
    }
}

/// Approval answers with the lending record it opened.
pub struct RecordPresenter;

impl Exhaust<LendingRecordDto> for RecordPresenter {
    type To = Json<LendingRecordResponse>;
    fn emit(&self, input: LendingRecordDto) -> Self::To {
        Json(LendingRecordResponse::from(input))
    }
}
