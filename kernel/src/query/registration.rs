use crate::database::Transaction;
use crate::entity::{AccountId, EventId, Registration, RegistrationId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait RegistrationQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &RegistrationId,
    ) -> error_stack::Result<Option<Registration>, KernelError>;

    async fn find_by_event(
        &self,
        con: &mut Connection,
        event_id: &EventId,
    ) -> error_stack::Result<Vec<Registration>, KernelError>;

    async fn find_by_event_and_attendee(
        &self,
        con: &mut Connection,
        event_id: &EventId,
        attendee_id: &AccountId,
    ) -> error_stack::Result<Option<Registration>, KernelError>;
}

pub trait DependOnRegistrationQuery<Connection: Transaction>: Sync + Send + 'static {
    type RegistrationQuery: RegistrationQuery<Connection>;
    fn registration_query(&self) -> &Self::RegistrationQuery;
}
