use crate::controller::Intake;
use application::transfer::{
    BorrowRequestActionDto, CreateBorrowRequestDto, GetBorrowRequestDto,
    GetRequestsByRequesterDto, GetRequestsByStatusDto,
};
use kernel::prelude::entity::BorrowRequestStatus;
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    requester_id: i64,
    game_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end_date: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    requester_id: Option<i64>,
    status: Option<BorrowRequestStatus>,
}

/// Principal for approve/decline, supplied in the body.
#[derive(Debug, Deserialize)]
pub struct PrincipalBody {
    acting_account_id: i64,
}

/// Principal for withdraw, supplied in the query string (DELETE carries no
/// body).
#[derive(Debug, Deserialize)]
pub struct PrincipalQuery {
    acting_account_id: i64,
}

pub enum ListSelector {
    ByRequester(GetRequestsByRequesterDto),
    ByStatus(GetRequestsByStatusDto),
    Unspecified,
}

pub struct Transformer;

impl Intake<CreateRequestBody> for Transformer {
    type To = CreateBorrowRequestDto;
    fn emit(&self, input: CreateRequestBody) -> Self::To {
        Self::To {
            requester_id: input.requester_id,
            game_id: input.game_id,
            start_date: input.start_date,
            end_date: input.end_date,
        }
    }
}

impl Intake<ListRequestsQuery> for Transformer {
    type To = ListSelector;
    fn emit(&self, input: ListRequestsQuery) -> Self::To {
        match (input.requester_id, input.status) {
            (Some(requester_id), None) => {
                ListSelector::ByRequester(GetRequestsByRequesterDto { requester_id })
            }
            (None, Some(status)) => ListSelector::ByStatus(GetRequestsByStatusDto { status }),
            _ => ListSelector::Unspecified,
        }
    }
}

impl Intake<i64> for Transformer {
    type To = GetBorrowRequestDto;
    fn emit(&self, id: i64) -> Self::To {
        Self::To { id }
    }
}

impl Intake<(i64, PrincipalBody)> for Transformer {
    type To = BorrowRequestActionDto;
    fn emit(&self, (request_id, body): (i64, PrincipalBody)) -> Self::To {
        Self::To {
            request_id,
            acting_account_id: body.acting_account_id,
        }
    }
}

impl Intake<(i64, PrincipalQuery)> for Transformer {
    type To = BorrowRequestActionDto;
    fn emit(&self, (request_id, query): (i64, PrincipalQuery)) -> Self::To {
        Self::To {
            request_id,
            acting_account_id: query.acting_account_id,
        }
    }
}
