use crate::database::Transaction;
use crate::entity::{Registration, RegistrationDraft, RegistrationId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait RegistrationModifier<Connection: Transaction>: 'static + Sync + Send {
    /// Atomic with the capacity check: the insert and the count re-check
    /// happen under the same guard, so concurrent registrations cannot
    /// overbook. `None` reports an event already at capacity — nothing is
    /// written. A duplicate attendee fails with `Conflict`.
    async fn create_within_capacity(
        &self,
        con: &mut Connection,
        draft: &RegistrationDraft,
    ) -> error_stack::Result<Option<Registration>, KernelError>;

    async fn delete(
        &self,
        con: &mut Connection,
        id: &RegistrationId,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnRegistrationModifier<Connection: Transaction>: 'static + Sync + Send {
    type RegistrationModifier: RegistrationModifier<Connection>;
    fn registration_modifier(&self) -> &Self::RegistrationModifier;
}
