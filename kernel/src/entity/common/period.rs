use error_stack::Report;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vodca::References;

use crate::KernelError;

/// The interval a game is expected to be away. Invariant: `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, References, Serialize, Deserialize)]
pub struct LoanPeriod {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl LoanPeriod {
    pub fn new(
        start: impl Into<OffsetDateTime>,
        end: impl Into<OffsetDateTime>,
    ) -> error_stack::Result<Self, KernelError> {
        let (start, end) = (start.into(), end.into());
        if end < start {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("loan ends ({end}) before it starts ({start})")));
        }
        Ok(Self { start, end })
    }

    pub fn ends_before(&self, at: &OffsetDateTime) -> bool {
        self.end < *at
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn rejects_inverted_period() {
        let inverted = LoanPeriod::new(
            datetime!(2024-01-07 00:00 UTC),
            datetime!(2024-01-01 00:00 UTC),
        )
        .expect_err("must not validate");
        assert!(matches!(inverted.current_context(), KernelError::Validation));
    }

    #[test]
    fn single_day_period_is_valid() {
        let day = datetime!(2024-01-01 00:00 UTC);
        assert!(LoanPeriod::new(day, day).is_ok());
    }

    #[test]
    fn ends_before_is_exclusive_at_the_boundary() {
        let period = LoanPeriod::new(
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-01-07 00:00 UTC),
        )
        .unwrap();
        assert!(!period.ends_before(&datetime!(2024-01-07 00:00 UTC)));
        assert!(period.ends_before(&datetime!(2024-01-07 00:00:01 UTC)));
    }
}
