use crate::database::Transaction;
use crate::entity::{Event, EventId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait EventQuery<Connection: Transaction>: Sync + Send + 'static {
    async fn find_by_id(
        &self,
        con: &mut Connection,
        id: &EventId,
    ) -> error_stack::Result<Option<Event>, KernelError>;

    /// Participant count is always derived by counting registrations.
    async fn registered_count(
        &self,
        con: &mut Connection,
        id: &EventId,
    ) -> error_stack::Result<i64, KernelError>;
}

pub trait DependOnEventQuery<Connection: Transaction>: Sync + Send + 'static {
    type EventQuery: EventQuery<Connection>;
    fn event_query(&self) -> &Self::EventQuery;
}
