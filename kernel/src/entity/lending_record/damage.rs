use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

/// Owner's assessment at close time. Absent until the record closes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct DamageReport {
    flagged: bool,
    notes: Option<String>,
}

impl DamageReport {
    pub fn new(flagged: bool, notes: Option<String>) -> Self {
        Self { flagged, notes }
    }

    pub fn undamaged() -> Self {
        Self::new(false, None)
    }
}
