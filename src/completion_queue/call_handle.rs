use std::fmt;

/// Opaque reference to a native call object living inside the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CallHandle(u64);

impl CallHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call#{}", self.0)
    }
}
