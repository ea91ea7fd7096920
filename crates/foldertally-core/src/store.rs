//! The persistence seam for state carried between runs.

use std::sync::Mutex;

use crate::error::StoreError;

/// Reads and writes one opaque blob of persisted state.
pub trait RawStore {
    /// Human-readable location, used in logs and errors.
    fn location(&self) -> String;

    /// Read the stored bytes; `Ok(None)` when nothing has been stored yet.
    fn read_raw(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the stored bytes.
    fn write_raw(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

impl<T: RawStore + ?Sized> RawStore for &T {
    fn location(&self) -> String {
        (**self).location()
    }

    fn read_raw(&self) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).read_raw()
    }

    fn write_raw(&self, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write_raw(bytes)
    }
}

/// In-memory store, for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `bytes`.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
        }
    }

    /// Snapshot of the stored bytes.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RawStore for MemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn read_raw(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.contents())
    }

    fn write_raw(&self, bytes: &[u8]) -> Result<(), StoreError> {
        *self
            .bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.read_raw().unwrap().is_none());

        store.write_raw(b"{}").unwrap();
        assert_eq!(store.read_raw().unwrap().as_deref(), Some(&b"{}"[..]));
    }
}
