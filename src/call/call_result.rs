use crate::{metadata::Metadata, operation::OperationGroup};
use bytes::Bytes;

/// Outcome handed to one-shot and server-streaming completions.
///
/// A failed batch is reported as the all-default value (status code `0`,
/// every optional field absent); see `is_empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallResult {
    pub status_code: i32,
    pub status_message: Option<String>,
    pub result_data: Option<Bytes>,
    pub initial_metadata: Option<Metadata>,
    pub trailing_metadata: Option<Metadata>,
}

impl CallResult {
    /// Decodes whatever the finished `group` received. Fields for operations
    /// the group did not contain stay absent.
    pub(crate) fn from_operation_group(group: &OperationGroup) -> Self {
        if !group.success() {
            return Self::default();
        }

        Self {
            status_code: group.received_status_code().unwrap_or_default(),
            status_message: group.received_status_message().map(str::to_owned),
            result_data: group.received_message().map(|message| message.data()),
            initial_metadata: group.received_initial_metadata().cloned(),
            trailing_metadata: group.received_trailing_metadata().cloned(),
        }
    }

    /// True for the value delivered when the batch failed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
