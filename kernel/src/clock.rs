use time::OffsetDateTime;

/// Source of "now" for overdue computation and close timestamps.
///
/// Engines never read the wall clock directly. Production wires a system
/// clock in the driver; tests construct modules with [`FixedTimeProvider`].
pub trait TimeProvider: 'static + Sync + Send {
    fn now(&self) -> OffsetDateTime;
}

pub trait DependOnTimeProvider: 'static + Sync + Send {
    type TimeProvider: TimeProvider;
    fn time_provider(&self) -> &Self::TimeProvider;
}

/// Always answers with the instant it was constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTimeProvider(OffsetDateTime);

impl FixedTimeProvider {
    pub fn new(time: impl Into<OffsetDateTime>) -> Self {
        Self(time.into())
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
