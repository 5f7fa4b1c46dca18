use crate::database::Transaction;
use crate::entity::{ClosedAt, DamageReport, LendingRecord, LendingRecordDraft, LendingRecordId};
use crate::KernelError;

/// Every transition is a single conditional write against the stored status;
/// `false` means the guard did not hold (raced or incompatible state).
#[async_trait::async_trait]
pub trait LendingRecordModifier<Connection: Transaction>: 'static + Sync + Send {
    /// Fails with `Conflict` when an open record for the same borrow request
    /// already exists.
    async fn create(
        &self,
        con: &mut Connection,
        draft: &LendingRecordDraft,
    ) -> error_stack::Result<LendingRecord, KernelError>;

    /// ACTIVE -> RETURN_PENDING.
    async fn mark_returned(
        &self,
        con: &mut Connection,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError>;

    /// ACTIVE | RETURN_PENDING -> DISPUTED.
    async fn dispute(
        &self,
        con: &mut Connection,
        id: &LendingRecordId,
    ) -> error_stack::Result<bool, KernelError>;

    /// Any non-CLOSED -> CLOSED, recording the damage assessment and close
    /// timestamp. At most one close ever succeeds.
    async fn close(
        &self,
        con: &mut Connection,
        id: &LendingRecordId,
        damage: &DamageReport,
        closed_at: &ClosedAt,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnLendingRecordModifier<Connection: Transaction>: 'static + Sync + Send {
    type LendingRecordModifier: LendingRecordModifier<Connection>;
    fn lending_record_modifier(&self) -> &Self::LendingRecordModifier;
}
