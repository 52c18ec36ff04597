use crate::constants::GRPC_CALL_OK;
use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;

/// Invocation failures reported by the engine when a batch is submitted.
///
/// Discriminants match the engine's raw codes; codes outside the known range
/// decode as `Unknown`.
#[repr(i32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, FromPrimitive, IntoPrimitive)]
pub enum CallError {
    /// Non-error sentinel; never returned inside `Err`.
    Ok = 0,
    #[num_enum(default)]
    Unknown = 1,
    NotOnServer = 2,
    NotOnClient = 3,
    AlreadyAccepted = 4,
    AlreadyInvoked = 5,
    NotInvoked = 6,
    AlreadyFinished = 7,
    TooManyOperations = 8,
    InvalidFlags = 9,
    InvalidMetadata = 10,
    InvalidMessage = 11,
    NotServerCompletionQueue = 12,
    BatchTooBig = 13,
    PayloadTypeMismatch = 14,
}

impl CallError {
    pub fn from_code(code: i32) -> Self {
        Self::from(code)
    }

    pub fn code(self) -> i32 {
        self.into()
    }

    /// Maps a raw submission code to `Ok(())` or the matching error.
    pub fn check(code: i32) -> Result<(), CallError> {
        if code == GRPC_CALL_OK {
            Ok(())
        } else {
            Err(Self::from_code(code))
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            CallError::Ok => "ok",
            CallError::Unknown => "unknown call error",
            CallError::NotOnServer => "operation is not valid on the server",
            CallError::NotOnClient => "operation is not valid on the client",
            CallError::AlreadyAccepted => "call has already been accepted",
            CallError::AlreadyInvoked => "call has already been invoked",
            CallError::NotInvoked => "call has not been invoked",
            CallError::AlreadyFinished => "call has already finished",
            CallError::TooManyOperations => "too many operations of one kind in flight",
            CallError::InvalidFlags => "invalid flags",
            CallError::InvalidMetadata => "invalid metadata",
            CallError::InvalidMessage => "invalid message",
            CallError::NotServerCompletionQueue => "completion queue is not a server queue",
            CallError::BatchTooBig => "batch too big",
            CallError::PayloadTypeMismatch => "payload type mismatch",
        };
        write!(f, "{description} (code {})", self.code())
    }
}

impl std::error::Error for CallError {}
