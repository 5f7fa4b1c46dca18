use crate::database::Transaction;
use crate::entity::{Event, EventDraft, EventId, EventRevision};
use crate::KernelError;

#[async_trait::async_trait]
pub trait EventModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(
        &self,
        con: &mut Connection,
        draft: &EventDraft,
    ) -> error_stack::Result<Event, KernelError>;

    /// Conditional update: a revised capacity applies only while it still
    /// covers the current registration count, re-checked in the store.
    /// `false` reports a capacity that would strand existing registrations.
    async fn revise(
        &self,
        con: &mut Connection,
        id: &EventId,
        revision: &EventRevision,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnEventModifier<Connection: Transaction>: 'static + Sync + Send {
    type EventModifier: EventModifier<Connection>;
    fn event_modifier(&self) -> &Self::EventModifier;
}
