use crate::{message_buffer::MessageBuffer, metadata::Metadata};

/// Per-operation payloads reported by the engine for a finished batch.
///
/// Each field is only meaningful when the batch contained the matching
/// receive operation; `OperationGroup` enforces that when decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResults {
    pub initial_metadata: Option<Metadata>,
    pub message: Option<MessageBuffer>,
    pub status_code: Option<i32>,
    pub status_message: Option<String>,
    pub trailing_metadata: Option<Metadata>,
}

impl BatchResults {
    pub fn with_initial_metadata(mut self, metadata: Metadata) -> Self {
        self.initial_metadata = Some(metadata);
        self
    }

    pub fn with_message(mut self, message: impl Into<MessageBuffer>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, code: i32, message: impl Into<String>) -> Self {
        self.status_code = Some(code);
        self.status_message = Some(message.into());
        self
    }

    pub fn with_trailing_metadata(mut self, metadata: Metadata) -> Self {
        self.trailing_metadata = Some(metadata);
        self
    }
}
