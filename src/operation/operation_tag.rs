use crate::utils::increment_u64_id;
use std::fmt;

/// Correlation tag linking a submitted batch to its completion.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OperationTag(u64);

impl OperationTag {
    /// Allocates a fresh, process-unique tag.
    pub fn next() -> Self {
        Self(increment_u64_id())
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
