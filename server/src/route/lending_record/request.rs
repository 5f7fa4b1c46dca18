use crate::controller::Intake;
use application::transfer::{
    CloseRecordDto, GetLendingRecordDto, ListLendingRecordsDto, RecordActionDto,
};
use kernel::prelude::entity::LendingStatus;
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct RecordFilterQuery {
    status: Option<LendingStatus>,
    owner_id: Option<i64>,
    borrower_id: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    lent_from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    lent_until: Option<OffsetDateTime>,
    page: Option<i64>,
    size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PrincipalBody {
    acting_account_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CloseRecordBody {
    acting_account_id: i64,
    #[serde(default)]
    damaged: bool,
    damage_notes: Option<String>,
}

pub struct Transformer;

impl Intake<RecordFilterQuery> for Transformer {
    type To = ListLendingRecordsDto;
    fn emit(&self, input: RecordFilterQuery) -> Self::To {
        Self::To {
            status: input.status,
            owner_id: input.owner_id,
            borrower_id: input.borrower_id,
            lent_from: input.lent_from,
            lent_until: input.lent_until,
            page: input.page,
            size: input.size,
        }
    }
}

impl Intake<i64> for Transformer {
    type To = GetLendingRecordDto;
    fn emit(&self, id: i64) -> Self::To {
        Self::To { id }
    }
}

impl Intake<(i64, PrincipalBody)> for Transformer {
    type To = RecordActionDto;
    fn emit(&self, (record_id, body): (i64, PrincipalBody)) -> Self::To {
        Self::To {
            record_id,
            acting_account_id: body.acting_account_id,
        }
    }
}

impl Intake<(i64, CloseRecordBody)> for Transformer {
    type To = CloseRecordDto;
    fn emit(&self, (record_id, body): (i64, CloseRecordBody)) -> Self::To {
        Self::To {
            record_id,
            acting_account_id: body.acting_account_id,
            damaged: body.damaged,
            damage_notes: body.damage_notes,
        }
    }
}
