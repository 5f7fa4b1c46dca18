use crate::controller::Exhaust;
use application::transfer::{LendingRecordDto, PageDto};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct LendingRecordResponse {
    id: i64,
    request_id: i64,
    game_id: i64,
    owner_id: i64,
    borrower_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end_date: OffsetDateTime,
    status: String,
    damaged: Option<bool>,
    damage_notes: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    closed_at: Option<OffsetDateTime>,
}

impl From<LendingRecordDto> for LendingRecordResponse {
    fn from(value: LendingRecordDto) -> Self {
        Self {
            id: value.id,
            request_id: value.request_id,
            game_id: value.game_id,
            owner_id: value.owner_id,
            borrower_id: value.borrower_id,
            start_date: value.start_date,
            end_date: value.end_date,
            status: value.status,
            damaged: value.damaged,
            damage_notes: value.damage_notes,
            closed_at: value.closed_at,
        }
    }
}

impl IntoResponse for LendingRecordResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct RecordPageResponse {
    items: Vec<LendingRecordResponse>,
    total_items: i64,
    total_pages: i64,
    page: i64,
}

pub struct Presenter;

impl Exhaust<LendingRecordDto> for Presenter {
    type To = Json<LendingRecordResponse>;
    fn emit(&self, input: LendingRecordDto) -> Self::To {
        Json(LendingRecordResponse::from(input))
    }
}

impl Exhaust<Option<LendingRecordDto>> for Presenter {
    type To = Option<LendingRecordResponse>;
    fn emit(&self, input: Option<LendingRecordDto>) -> Self::To {
        input.map(LendingRecordResponse::from)
    }
}

impl Exhaust<Vec<LendingRecordDto>> for Presenter {
    type To = Json<Vec<LendingRecordResponse>>;
    fn emit(&self, input: Vec<LendingRecordDto>) -> Self::To {
        Json(input.into_iter().map(LendingRecordResponse::from).collect())
    }
}

impl Exhaust<PageDto<LendingRecordDto>> for Presenter {
    type To = Json<RecordPageResponse>;
    fn emit(&self, input: PageDto<LendingRecordDto>) -> Self::To {
        Json(RecordPageResponse {
            items: input
                .items
                .into_iter()
                .map(LendingRecordResponse::from)
                .collect(),
            total_items: input.total_items,
            total_pages: input.total_pages,
            page: input.page,
        })
    }
}
