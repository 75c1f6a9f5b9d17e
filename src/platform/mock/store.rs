//! Mock key-value store implementation for testing
//!
//! Provides an in-memory namespaced store with per-key failure injection,
//! used to exercise the calibration persistence paths.

use crate::platform::{
    error::StoreError,
    traits::{KeyValueStore, MAX_STRING_LEN},
    Result,
};
use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::vec::Vec;

/// Value as stored, tagged by type
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    U32(u32),
    I16(i16),
    Str(String),
}

/// Mock key-value store
///
/// Keys live under the namespace selected by `init`. Reading a key back with
/// a different type than it was written with fails, like the real store.
#[derive(Debug, Default)]
pub struct MockStore {
    namespace: Option<String>,
    entries: BTreeMap<(String, String), StoredValue>,
    fail_init: bool,
    fail_put_keys: Vec<String>,
}

impl MockStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init` fail with `InitFailed`
    pub fn set_fail_init(&mut self, fail: bool) {
        self.fail_init = fail;
    }

    /// Make writes to the given key fail with `WriteFailed`
    pub fn fail_puts_for(&mut self, key: &str) {
        self.fail_put_keys.push(key.to_string());
    }

    /// Namespace currently selected, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Number of keys stored across all namespaces
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    fn ns(&self) -> Result<String> {
        self.namespace.clone().ok_or(StoreError::InitFailed.into())
    }

    fn get(&mut self, key: &str) -> Result<&StoredValue> {
        let ns = self.ns()?;
        self.entries
            .get(&(ns, key.to_string()))
            .ok_or(StoreError::KeyNotFound.into())
    }

    fn put(&mut self, key: &str, value: StoredValue) -> Result<()> {
        if self.fail_put_keys.iter().any(|k| k == key) {
            return Err(StoreError::WriteFailed.into());
        }
        let ns = self.ns()?;
        self.entries.insert((ns, key.to_string()), value);
        Ok(())
    }
}

impl KeyValueStore for MockStore {
    fn init(&mut self, namespace: &str) -> Result<()> {
        if self.fail_init {
            return Err(StoreError::InitFailed.into());
        }
        self.namespace = Some(namespace.to_string());
        Ok(())
    }

    fn get_u32(&mut self, key: &str) -> Result<u32> {
        match self.get(key)? {
            StoredValue::U32(v) => Ok(*v),
            _ => Err(StoreError::ReadFailed.into()),
        }
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<()> {
        self.put(key, StoredValue::U32(value))
    }

    fn get_i16(&mut self, key: &str) -> Result<i16> {
        match self.get(key)? {
            StoredValue::I16(v) => Ok(*v),
            _ => Err(StoreError::ReadFailed.into()),
        }
    }

    fn put_i16(&mut self, key: &str, value: i16) -> Result<()> {
        self.put(key, StoredValue::I16(value))
    }

    fn get_string(&mut self, key: &str) -> Result<heapless::String<MAX_STRING_LEN>> {
        match self.get(key)? {
            StoredValue::Str(v) => {
                let mut out = heapless::String::new();
                out.push_str(v).map_err(|_| StoreError::ValueTooLong)?;
                Ok(out)
            }
            _ => Err(StoreError::ReadFailed.into()),
        }
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.put(key, StoredValue::Str(value.to_string()))
    }

    fn erase_key(&mut self, key: &str) -> Result<()> {
        let ns = self.ns()?;
        match self.entries.remove(&(ns, key.to_string())) {
            Some(_) => Ok(()),
            None => Err(StoreError::KeyNotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_round_trip() {
        let mut store = MockStore::new();
        store.init("gnssdr0").unwrap();

        store.put_u32("yaw", 27000).unwrap();
        store.put_i16("pitch", -1500).unwrap();
        store.put_string("id", "gnssDr").unwrap();

        assert_eq!(store.get_u32("yaw").unwrap(), 27000);
        assert_eq!(store.get_i16("pitch").unwrap(), -1500);
        assert_eq!(store.get_string("id").unwrap().as_str(), "gnssDr");
    }

    #[test]
    fn test_missing_key() {
        let mut store = MockStore::new();
        store.init("gnssdr0").unwrap();
        assert!(store.get_u32("yaw").is_err());
    }

    #[test]
    fn test_type_mismatch_fails() {
        let mut store = MockStore::new();
        store.init("gnssdr0").unwrap();
        store.put_u32("yaw", 1).unwrap();
        assert!(store.get_i16("yaw").is_err());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let mut store = MockStore::new();
        store.init("gnssdr0").unwrap();
        store.put_u32("yaw", 100).unwrap();

        store.init("gnssdr1").unwrap();
        assert!(store.get_u32("yaw").is_err());

        store.init("gnssdr0").unwrap();
        assert_eq!(store.get_u32("yaw").unwrap(), 100);
    }

    #[test]
    fn test_per_key_write_failure() {
        let mut store = MockStore::new();
        store.init("gnssdr0").unwrap();
        store.fail_puts_for("pitch");

        store.put_u32("yaw", 1).unwrap();
        assert!(store.put_i16("pitch", 2).is_err());
        // Earlier write survives; nothing rolled back
        assert_eq!(store.get_u32("yaw").unwrap(), 1);
    }

    #[test]
    fn test_erase_key() {
        let mut store = MockStore::new();
        store.init("gnssdr0").unwrap();
        store.put_u32("yaw", 1).unwrap();

        store.erase_key("yaw").unwrap();
        assert!(store.get_u32("yaw").is_err());
        assert!(store.erase_key("yaw").is_err());
    }
}
