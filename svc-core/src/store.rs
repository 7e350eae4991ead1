use crate::error::{Error, Result};
use crate::models::BlobHandle;

/// Append-only blob storage.
///
/// Handles are assigned sequentially and stay valid for the lifetime of the
/// store; blobs are never rewritten or reclaimed individually.
#[derive(Debug, Default)]
pub struct ContentStore {
    blobs: Vec<Box<[u8]>>,
    total_bytes: usize,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, bytes: impl Into<Box<[u8]>>) -> BlobHandle {
        let bytes = bytes.into();
        self.total_bytes += bytes.len();
        self.blobs.push(bytes);
        BlobHandle(self.blobs.len() - 1)
    }

    pub fn get(&self, handle: BlobHandle) -> Result<&[u8]> {
        self.blobs
            .get(handle.0)
            .map(|b| &b[..])
            .ok_or(Error::BlobNotFound(handle))
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Drops every blob, returning how many were held.
    pub(crate) fn release(&mut self) -> usize {
        let released = self.blobs.len();
        self.blobs = Vec::new();
        self.total_bytes = 0;
        released
    }
}
