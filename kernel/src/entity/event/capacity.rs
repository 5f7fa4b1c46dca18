use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::KernelError;

/// Maximum number of registered participants. Invariant: at least 1.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct EventCapacity(i32);

impl EventCapacity {
    pub fn new(value: impl Into<i32>) -> error_stack::Result<Self, KernelError> {
        let value = value.into();
        if value < 1 {
            return Err(Report::new(KernelError::Validation)
                .attach_printable(format!("max participants must be at least 1, got {value}")));
        }
        Ok(Self(value))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_zero_and_negative_capacity() {
        assert!(EventCapacity::new(0).is_err());
        assert!(EventCapacity::new(-3).is_err());
        assert!(EventCapacity::new(1).is_ok());
    }
}
