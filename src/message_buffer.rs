use bytes::Bytes;

/// Opaque owner of one serialized message payload.
///
/// Backed by `Bytes`, so cloning a buffer (e.g. to retain it until its send
/// batch completes) does not copy the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBuffer {
    bytes: Bytes,
}

impl MessageBuffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { bytes: data.into() }
    }

    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Returns the payload as a cheaply cloned `Bytes` handle.
    pub fn data(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<Bytes> for MessageBuffer {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<Vec<u8>> for MessageBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { bytes: data.into() }
    }
}

impl From<&'static [u8]> for MessageBuffer {
    fn from(data: &'static [u8]) -> Self {
        Self {
            bytes: Bytes::from_static(data),
        }
    }
}

impl<const N: usize> From<&'static [u8; N]> for MessageBuffer {
    fn from(data: &'static [u8; N]) -> Self {
        Self {
            bytes: Bytes::from_static(data),
        }
    }
}

impl AsRef<[u8]> for MessageBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
