//! Persistent key-value store trait
//!
//! Namespaced typed storage for small configuration values (NVS-style on the
//! reference board). One instance is opened per receiver profile.

use crate::platform::Result;
use heapless::String;

/// Maximum key length accepted by implementations
pub const MAX_KEY_LEN: usize = 15;

/// Maximum length of string values
pub const MAX_STRING_LEN: usize = 32;

/// Namespaced persistent key-value storage
pub trait KeyValueStore {
    /// Open (creating if necessary) the given namespace.
    ///
    /// All subsequent accessors operate within this namespace.
    fn init(&mut self, namespace: &str) -> Result<()>;

    /// Read a `u32` value
    fn get_u32(&mut self, key: &str) -> Result<u32>;

    /// Write a `u32` value
    fn put_u32(&mut self, key: &str, value: u32) -> Result<()>;

    /// Read an `i16` value
    fn get_i16(&mut self, key: &str) -> Result<i16>;

    /// Write an `i16` value
    fn put_i16(&mut self, key: &str, value: i16) -> Result<()>;

    /// Read a string value
    fn get_string(&mut self, key: &str) -> Result<String<MAX_STRING_LEN>>;

    /// Write a string value
    fn put_string(&mut self, key: &str, value: &str) -> Result<()>;

    /// Erase a single key
    fn erase_key(&mut self, key: &str) -> Result<()>;
}
