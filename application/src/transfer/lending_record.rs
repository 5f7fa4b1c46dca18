use time::OffsetDateTime;

use kernel::prelude::entity::{
    DestructDamageReport, DestructLendingRecord, LendingRecord, LendingStatus, Page,
};

/// Projection of a record at one instant. `status` reports OVERDUE for an
/// active record whose period has elapsed; the stored status stays ACTIVE.
#[derive(Debug, Clone)]
pub struct LendingRecordDto {
    pub id: i64,
    pub request_id: i64,
    pub game_id: i64,
    pub owner_id: i64,
    pub borrower_id: i64,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub status: String,
    pub damaged: Option<bool>,
    pub damage_notes: Option<String>,
    pub closed_at: Option<OffsetDateTime>,
}

impl LendingRecordDto {
    pub fn project(record: LendingRecord, now: &OffsetDateTime) -> Self {
        let overdue = record.is_overdue(now);
        let DestructLendingRecord {
            id,
            request_id,
            game_id,
            owner_id,
            borrower_id,
            period,
            status,
            damage,
            closed_at,
        } = record.into_destruct();
        let status = if overdue {
            "OVERDUE".to_string()
        } else {
            status.as_str().to_string()
        };
        let (damaged, damage_notes) = match damage {
            None => (None, None),
            Some(report) => {
                let DestructDamageReport { flagged, notes } = report.into_destruct();
                (Some(flagged), notes)
            }
        };
        Self {
            id: id.into(),
            request_id: request_id.into(),
            game_id: game_id.into(),
            owner_id: owner_id.into(),
            borrower_id: borrower_id.into(),
            start_date: *period.start(),
            end_date: *period.end(),
            status,
            damaged,
            damage_notes,
            closed_at: closed_at.map(|at| *at.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub total_pages: i64,
    pub page: i64,
}

impl PageDto<LendingRecordDto> {
    pub fn project(page: Page<LendingRecord>, now: &OffsetDateTime) -> Self {
        let total_items = page.total_items();
        let total_pages = page.total_pages();
        let current = page.page();
        Self {
            items: page
                .into_items()
                .into_iter()
                .map(|record| LendingRecordDto::project(record, now))
                .collect(),
            total_items,
            total_pages,
            page: current,
        }
    }
}

/// Mark-returned and dispute act on a record id on behalf of a principal.
pub struct RecordActionDto {
    pub record_id: i64,
    pub acting_account_id: i64,
}

pub struct CloseRecordDto {
    pub record_id: i64,
    pub acting_account_id: i64,
    pub damaged: bool,
    pub damage_notes: Option<String>,
}

pub struct GetLendingRecordDto {
    pub id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ListLendingRecordsDto {
    pub status: Option<LendingStatus>,
    pub owner_id: Option<i64>,
    pub borrower_id: Option<i64>,
    pub lent_from: Option<OffsetDateTime>,
    pub lent_until: Option<OffsetDateTime>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}
