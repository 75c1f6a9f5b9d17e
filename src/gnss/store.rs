//! Persisted calibration store
//!
//! Mounting angles survive power cycles in a per-profile namespace of the
//! platform key-value store, under four keys: an identity tag plus the
//! three axes. The group is written in a fixed order and a failure on any
//! key aborts the remaining writes WITHOUT rolling back keys already
//! written, matching the receiver firmware this interoperates with, so
//! partially-written groups can be observed after a power loss.

use crate::gnss::types::{AlignmentValues, GnssError};
use crate::platform::{error::StoreError, traits::KeyValueStore, PlatformError};
use core::fmt::Write;
use heapless::String;

/// Identity tag marking an initialized namespace
pub const ID_TAG: &str = "gnssDr";

const KEY_ID: &str = "id";
const KEY_YAW: &str = "yaw";
const KEY_PITCH: &str = "pitch";
const KEY_ROLL: &str = "roll";

/// Per-profile calibration persistence
pub struct CalibrationStore<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> CalibrationStore<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Open the namespace for a profile (`gnssdr0`, `gnssdr1`, ...)
    pub fn init(&mut self, profile: u8) -> Result<(), GnssError> {
        let mut namespace: String<15> = String::new();
        write!(namespace, "gnssdr{}", profile).map_err(|_| GnssError::InvalidProfile)?;
        self.store.init(&namespace)?;
        Ok(())
    }

    /// Load the stored alignment values.
    ///
    /// A namespace whose identity key is missing has never been written;
    /// defaults are persisted first and then returned.
    pub fn load(&mut self) -> Result<AlignmentValues, GnssError> {
        match self.store.get_string(KEY_ID) {
            Ok(_) => Ok(AlignmentValues {
                yaw_cd: self.store.get_u32(KEY_YAW)?,
                pitch_cd: self.store.get_i16(KEY_PITCH)?,
                roll_cd: self.store.get_i16(KEY_ROLL)?,
            }),
            Err(PlatformError::Store(StoreError::KeyNotFound)) => {
                let defaults = AlignmentValues::default();
                self.write_group(&defaults)?;
                Ok(defaults)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist validated alignment values.
    ///
    /// Out-of-range values are rejected before any key is touched.
    pub fn save(&mut self, values: &AlignmentValues) -> Result<(), GnssError> {
        if !values.is_within_range() {
            return Err(GnssError::CalibrationOutOfRange);
        }
        self.write_group(values)
    }

    /// Erase the whole calibration group.
    ///
    /// Keys that are already absent are skipped; any other store failure
    /// aborts the remaining erases.
    pub fn erase(&mut self) -> Result<(), GnssError> {
        for key in [KEY_ID, KEY_YAW, KEY_PITCH, KEY_ROLL] {
            match self.store.erase_key(key) {
                Ok(()) | Err(PlatformError::Store(StoreError::KeyNotFound)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    // Fixed write order: id, yaw, pitch, roll; first failure aborts, no rollback.
    fn write_group(&mut self, values: &AlignmentValues) -> Result<(), GnssError> {
        self.store.put_string(KEY_ID, ID_TAG)?;
        self.store.put_u32(KEY_YAW, values.yaw_cd)?;
        self.store.put_i16(KEY_PITCH, values.pitch_cd)?;
        self.store.put_i16(KEY_ROLL, values.roll_cd)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockStore;

    fn store() -> CalibrationStore<MockStore> {
        let mut s = CalibrationStore::new(MockStore::new());
        s.init(0).unwrap();
        s
    }

    #[test]
    fn test_load_writes_defaults_when_uninitialized() {
        let mut s = store();
        let values = s.load().unwrap();
        assert_eq!(values, AlignmentValues::default());

        // Identity key was written, so the next load reads back the group
        assert_eq!(s.store.get_string("id").unwrap().as_str(), ID_TAG);
        assert_eq!(s.load().unwrap(), AlignmentValues::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut s = store();
        let values = AlignmentValues {
            yaw_cd: 27_000,
            pitch_cd: -1_500,
            roll_cd: 250,
        };
        s.save(&values).unwrap();
        assert_eq!(s.load().unwrap(), values);
    }

    #[test]
    fn test_save_rejects_out_of_range_without_writing() {
        let mut s = store();
        let bad = AlignmentValues {
            yaw_cd: 40_000,
            pitch_cd: 0,
            roll_cd: 0,
        };
        assert_eq!(s.save(&bad), Err(GnssError::CalibrationOutOfRange));
        // Nothing was written, not even the identity key
        assert_eq!(s.store.key_count(), 0);
    }

    #[test]
    fn test_partial_write_failure_no_rollback() {
        let mut inner = MockStore::new();
        inner.fail_puts_for("pitch");
        let mut s = CalibrationStore::new(inner);
        s.init(0).unwrap();

        let values = AlignmentValues {
            yaw_cd: 100,
            pitch_cd: 200,
            roll_cd: 300,
        };
        assert!(s.save(&values).is_err());

        // id and yaw were written before the failure and stay written
        assert_eq!(s.store.get_string("id").unwrap().as_str(), ID_TAG);
        assert_eq!(s.store.get_u32("yaw").unwrap(), 100);
        assert!(s.store.get_i16("pitch").is_err());
        assert!(s.store.get_i16("roll").is_err());
    }

    #[test]
    fn test_erase_tolerates_missing_keys() {
        let mut s = store();
        s.save(&AlignmentValues::default()).unwrap();
        s.erase().unwrap();
        // A second erase over an empty namespace still succeeds
        s.erase().unwrap();
        assert_eq!(s.store.key_count(), 0);
    }

    #[test]
    fn test_namespaces_scoped_per_profile() {
        let mut s0 = CalibrationStore::new(MockStore::new());
        s0.init(0).unwrap();
        s0.save(&AlignmentValues {
            yaw_cd: 1,
            pitch_cd: 2,
            roll_cd: 3,
        })
        .unwrap();
        assert_eq!(s0.store.namespace(), Some("gnssdr0"));
    }
}
