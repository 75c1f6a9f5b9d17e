//! Dead-reckoning calibration manager
//!
//! Decides between the two mutually-exclusive calibration modes and builds
//! the configuration items pushed to the receiver for each. In automatic
//! mode, previously persisted values that pass validation are promoted to a
//! one-shot manual push, so a receiver that already converged once does not
//! have to re-derive its mounting angles from scratch.

use crate::gnss::types::{AlignmentStatus, AlignmentValues, CalibrationMode, DynamicsModel};
use crate::gnss::ubx::{keys, CfgItem};

/// Tri-state persistence flag carried by each profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistState {
    /// Nothing to persist
    #[default]
    Idle,
    /// Converged values waiting to be written
    Pending,
    /// Values written for this convergence; do not re-raise
    Done,
}

/// Whether stored values are worth promoting to a manual push.
///
/// The all-zero group is the store's default and means "never calibrated".
pub fn stored_is_usable(values: &AlignmentValues) -> bool {
    values.is_within_range() && *values != AlignmentValues::default()
}

/// Whether a freshly reported alignment status should raise the
/// pending-persist flag. Raised at most once per convergence: persistence
/// only re-arms after the flag returns to `Idle`.
pub fn should_persist(status: AlignmentStatus, mode: CalibrationMode, persist: PersistState) -> bool {
    mode == CalibrationMode::Auto && status.is_converged() && persist == PersistState::Idle
}

/// Classify a reported alignment status into the is-calibrated flag.
///
/// `UserDefined` means the device accepted fixed angles: calibrated when we
/// asked for manual mode, not yet validated when the device is supposed to
/// be auto-aligning.
pub fn is_calibrated(status: AlignmentStatus, mode: CalibrationMode) -> bool {
    match status {
        AlignmentStatus::UserDefined => mode == CalibrationMode::Manual,
        AlignmentStatus::RollPitchCalibrating | AlignmentStatus::RollPitchYawCalibrating => false,
        AlignmentStatus::CoarseAlignment | AlignmentStatus::FineAlignment => true,
    }
}

/// Configuration items enabling generic dead-reckoning operation
pub fn dr_settings_items(model: DynamicsModel) -> [CfgItem; 1] {
    [CfgItem {
        key: keys::NAVSPG_DYNMODEL,
        value: model.as_config_value() as u64,
    }]
}

/// Configuration items for a manual alignment push: automatic mount
/// alignment off, fixed angles in
pub fn manual_alignment_items(values: &AlignmentValues) -> [CfgItem; 4] {
    [
        CfgItem {
            key: keys::SFIMU_AUTO_MNTALG_ENA,
            value: 0,
        },
        CfgItem {
            key: keys::SFIMU_IMU_MNTALG_YAW,
            value: values.yaw_cd as u64,
        },
        CfgItem {
            key: keys::SFIMU_IMU_MNTALG_PITCH,
            value: values.pitch_cd as u16 as u64,
        },
        CfgItem {
            key: keys::SFIMU_IMU_MNTALG_ROLL,
            value: values.roll_cd as u16 as u64,
        },
    ]
}

/// Configuration item leaving the receiver to self-align
pub fn auto_alignment_items() -> [CfgItem; 1] {
    [CfgItem {
        key: keys::SFIMU_AUTO_MNTALG_ENA,
        value: 1,
    }]
}

/// Configuration item enabling sensor fusion
pub fn fusion_enable_items() -> [CfgItem; 1] {
    [CfgItem {
        key: keys::SFCORE_USE_SF,
        value: 1,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_usability() {
        assert!(!stored_is_usable(&AlignmentValues::default()));

        let usable = AlignmentValues {
            yaw_cd: 27_000,
            pitch_cd: -100,
            roll_cd: 50,
        };
        assert!(stored_is_usable(&usable));

        let out_of_range = AlignmentValues {
            yaw_cd: 36_001,
            pitch_cd: 0,
            roll_cd: 0,
        };
        assert!(!stored_is_usable(&out_of_range));
    }

    #[test]
    fn test_should_persist_once_per_convergence() {
        use AlignmentStatus::*;

        assert!(should_persist(
            CoarseAlignment,
            CalibrationMode::Auto,
            PersistState::Idle
        ));
        assert!(should_persist(
            FineAlignment,
            CalibrationMode::Auto,
            PersistState::Idle
        ));
        // Already pending or done: never re-raised
        assert!(!should_persist(
            FineAlignment,
            CalibrationMode::Auto,
            PersistState::Pending
        ));
        assert!(!should_persist(
            FineAlignment,
            CalibrationMode::Auto,
            PersistState::Done
        ));
        // Manual mode never persists
        assert!(!should_persist(
            FineAlignment,
            CalibrationMode::Manual,
            PersistState::Idle
        ));
        // Not converged yet
        assert!(!should_persist(
            RollPitchYawCalibrating,
            CalibrationMode::Auto,
            PersistState::Idle
        ));
    }

    #[test]
    fn test_is_calibrated_by_mode() {
        use AlignmentStatus::*;

        assert!(is_calibrated(UserDefined, CalibrationMode::Manual));
        assert!(!is_calibrated(UserDefined, CalibrationMode::Auto));
        assert!(is_calibrated(CoarseAlignment, CalibrationMode::Auto));
        assert!(is_calibrated(FineAlignment, CalibrationMode::Auto));
        assert!(!is_calibrated(RollPitchCalibrating, CalibrationMode::Auto));
    }

    #[test]
    fn test_manual_alignment_items_encode_signed_axes() {
        let items = manual_alignment_items(&AlignmentValues {
            yaw_cd: 18_000,
            pitch_cd: -9_000,
            roll_cd: -1,
        });
        assert_eq!(items[0].value, 0);
        assert_eq!(items[1].value, 18_000);
        // Two's complement bit patterns survive the u64 widening
        assert_eq!(items[2].value, 0xDCD8);
        assert_eq!(items[3].value, 0xFFFF);
    }
}
