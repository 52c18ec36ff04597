use crate::{message_buffer::MessageBuffer, metadata::Metadata};

/// Discriminant of an `Operation`, numbered like the engine's native op types.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OperationKind {
    SendInitialMetadata = 0,
    SendMessage = 1,
    SendCloseFromClient = 2,
    ReceiveInitialMetadata = 4,
    ReceiveMessage = 5,
    ReceiveStatusOnClient = 6,
}

/// One descriptor within a batch submitted to the completion-queue engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    SendInitialMetadata(Metadata),
    SendMessage(MessageBuffer),
    SendCloseFromClient,
    ReceiveInitialMetadata,
    ReceiveStatusOnClient,
    ReceiveMessage,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::SendInitialMetadata(_) => OperationKind::SendInitialMetadata,
            Operation::SendMessage(_) => OperationKind::SendMessage,
            Operation::SendCloseFromClient => OperationKind::SendCloseFromClient,
            Operation::ReceiveInitialMetadata => OperationKind::ReceiveInitialMetadata,
            Operation::ReceiveStatusOnClient => OperationKind::ReceiveStatusOnClient,
            Operation::ReceiveMessage => OperationKind::ReceiveMessage,
        }
    }
}
