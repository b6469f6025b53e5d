//! Durable key-value slots.
//!
//! The storefront keeps a handful of named text slots (cart, user profile,
//! theme, locally recorded orders) in a store shared by every open view.
//! Access goes through the [`KeyValueStore`] trait so the cart and session
//! logic can run against an in-memory fake in tests and a JSON file in the
//! CLI.
//!
//! There is no locking discipline across writers: a read-modify-write from one
//! view can overwrite a concurrent one from another, and the last write wins.

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Slot names used by the storefront.
pub mod keys {
    /// Key for the shopping cart line items.
    pub const CART: &str = "cart";

    /// Key for the signed-in user's profile.
    pub const USER: &str = "user";

    /// Key for the colour theme preference.
    pub const THEME: &str = "theme";

    /// Key for orders recorded locally while awaiting payment verification.
    pub const ORDERS: &str = "orders";
}

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("Storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backing medium holds data that is not a slot map.
    #[error("Storage is corrupt: {0}")]
    Corrupt(String),

    /// A previous writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A synchronous store of named text slots.
pub trait KeyValueStore {
    /// Read a slot. Returns `Ok(None)` if the slot was never written or was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a slot. Removing an absent slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read and decode a JSON slot.
///
/// Absent, unreadable, and malformed slots all read as `None`; the latter two
/// are logged and never propagated.
pub fn read_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(slot = key, error = %e, "Failed to read slot, treating as empty");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(slot = key, error = %e, "Malformed slot contents, treating as empty");
            None
        }
    }
}

/// Encode a value as JSON and write it to a slot.
///
/// # Errors
///
/// Returns an error if encoding fails or the store rejects the write.
pub fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_absent() {
        let store = MemoryStore::new();
        assert_eq!(read_json::<Vec<u32>, _>(&store, keys::CART), None);
    }

    #[test]
    fn test_read_json_malformed_is_none() {
        let store = MemoryStore::new();
        store.set(keys::CART, "not json").unwrap();
        assert_eq!(read_json::<Vec<u32>, _>(&store, keys::CART), None);
    }

    #[test]
    fn test_write_then_read_json() {
        let store = MemoryStore::new();
        write_json(&store, keys::ORDERS, &vec![1_u32, 2, 3]).unwrap();
        assert_eq!(read_json::<Vec<u32>, _>(&store, keys::ORDERS), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_shared_store_through_arc() {
        let store = Arc::new(MemoryStore::new());
        let other = Arc::clone(&store);
        store.set(keys::THEME, "dark").unwrap();
        assert_eq!(other.get(keys::THEME).unwrap().as_deref(), Some("dark"));
    }
}
