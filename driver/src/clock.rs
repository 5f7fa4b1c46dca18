use time::OffsetDateTime;

use kernel::interface::clock::{DependOnTimeProvider, TimeProvider};

use crate::database::PostgresDatabase;

pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

impl DependOnTimeProvider for PostgresDatabase {
    type TimeProvider = SystemTimeProvider;
    fn time_provider(&self) -> &Self::TimeProvider {
        &SystemTimeProvider
    }
}
