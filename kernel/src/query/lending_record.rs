use time::OffsetDateTime;

use crate::database::Transaction;
use crate::entity::{AccountId, LendingRecord, LendingRecordId, LendingStatus, Page, PageSelection};
use crate::KernelError;

/// AND-composed listing criteria; `None` means "no constraint". The date
/// range selects records whose loan period overlaps `[lent_from, lent_until]`
/// inclusively.
#[derive(Debug, Clone, Default)]
pub struct LendingRecordFilter {
    pub status: Option<LendingStatus>,
    pub owner_id: Option<AccountId>,
    pub borrower_id: Option<AccountId>,
    pub lent_from: Option<OffsetDateTime>,
    pub lent_until: Option<OffsetDateTime>,
}

#[async_trait::async_trait]
pub trait LendingRecordQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &LendingRecordId,
    ) -> error_stack::Result<Option<LendingRecord>, KernelError>;

    async fn find_filtered(
        &self,
        con: &mut Connection,
        filter: &LendingRecordFilter,
        selection: &PageSelection,
    ) -> error_stack::Result<Page<LendingRecord>, KernelError>;

    /// Recomputed from stored end dates against `now` on every call; no
    /// cached flag is consulted.
    async fn find_overdue(
        &self,
        con: &mut Connection,
        now: &OffsetDateTime,
    ) -> error_stack::Result<Vec<LendingRecord>, KernelError>;
}

pub trait DependOnLendingRecordQuery<Connection: Transaction>: Sync + Send + 'static {
    type LendingRecordQuery: LendingRecordQuery<Connection>;
    fn lending_record_query(&self) -> &Self::LendingRecordQuery;
}
