//! GNSS data model
//!
//! Types shared across the codec, calibration manager, FSM, and registry.
//! Wire-level bitfields are decoded once at the codec boundary into the
//! enums and flag types here; nothing downstream re-inspects raw bytes.

use crate::platform::{traits::TransportConfig, PlatformError};
use bitflags::bitflags;
use core::fmt;

/// Maximum sensors reported in one fusion status message
pub const MAX_ESF_SENSORS: usize = 15;

/// Maximum decryption-key frame retained for replay after restart
pub const MAX_KEY_FRAME_LEN: usize = 64;

/// Result type for GNSS operations
pub type Result<T> = core::result::Result<T, GnssError>;

/// GNSS orchestration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssError {
    /// Profile id out of range or not registered
    InvalidProfile,
    /// Registry already holds the maximum number of profiles
    RegistryFull,
    /// Device is already configured and running
    Busy,
    /// Operation requires a ready device or an open transport
    NotReady,
    /// Alignment values outside the permitted ranges
    CalibrationOutOfRange,
    /// Outbound payload exceeds the frame buffer
    FrameTooLarge,
    /// Platform layer failure
    Platform(PlatformError),
}

impl From<PlatformError> for GnssError {
    fn from(e: PlatformError) -> Self {
        GnssError::Platform(e)
    }
}

impl fmt::Display for GnssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GnssError::InvalidProfile => write!(f, "Invalid profile id"),
            GnssError::RegistryFull => write!(f, "Registry full"),
            GnssError::Busy => write!(f, "Device busy"),
            GnssError::NotReady => write!(f, "Device not ready"),
            GnssError::CalibrationOutOfRange => write!(f, "Calibration values out of range"),
            GnssError::FrameTooLarge => write!(f, "Frame too large"),
            GnssError::Platform(e) => write!(f, "Platform: {}", e),
        }
    }
}

/// Lifecycle FSM states
///
/// The bring-up sequence is linear from `EnableLogging` to `DeviceReady`;
/// `DeviceReady` is the steady loop from which stop, restart, persistence,
/// and dead-reckoning reconfiguration are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// No configuration attached; tick is a no-op
    Unconfigured,
    /// Claim the shared raw-message log ring (non-fatal if unavailable)
    EnableLogging,
    /// Bounded synchronous open-retry loop
    DeviceOpen,
    /// Arm the liveness watchdog
    WatchdogInit,
    /// Push generic receiver settings (message output, high precision)
    SetLocationSettings,
    /// Replay stored decryption keys (skipped when none configured)
    SetDecryptionKeys,
    /// Select the correction-data source
    SetCorrectionSource,
    /// Start binary and text receive sessions
    StartReceivers,
    /// Open the calibration store namespace
    InitStore,
    /// Decide manual vs automatic calibration
    DeadReckoningInit,
    /// Push caller-supplied (or stored) alignment values
    ManualCalibration,
    /// Consult the store, then leave the receiver to self-align
    AutoCalibration,
    /// Enable sensor fusion
    DeadReckoningStart,
    /// Steady state: harvest messages, watch health
    DeviceReady,
    /// Write converged alignment values to the store
    PersistCalibration,
    /// Reset receiver, tear down sessions, close transport
    DeviceRestart,
    /// Stop sessions and reset to Unconfigured
    DeviceStop,
    /// Grace period; destination depends on the previous state
    Wait,
    /// Open retry budget exhausted; terminal until stop
    Timeout,
    /// Unrecoverable failure; terminal until stop
    Error,
}

/// Result of one FSM tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickStatus {
    /// Idle, ready, or stopped
    Ok,
    /// Bring-up or recovery in progress
    Busy,
    /// In a terminal error state
    Error,
}

/// Position fix quality, as reported in the NMEA GGA quality field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixType {
    /// No usable fix
    #[default]
    Invalid,
    /// Autonomous 2D/3D GNSS fix
    Gnss,
    /// Differential correction applied
    Differential,
    /// RTK with fixed ambiguities
    RtkFixed,
    /// RTK with floating ambiguities
    RtkFloat,
    /// Inertial dead reckoning only
    DeadReckoning,
}

impl FixType {
    /// Classify a GGA quality digit. Digit 3 is reserved and unmapped.
    pub fn from_quality_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(FixType::Invalid),
            1 => Some(FixType::Gnss),
            2 => Some(FixType::Differential),
            // 3 reserved
            4 => Some(FixType::RtkFixed),
            5 => Some(FixType::RtkFloat),
            6 => Some(FixType::DeadReckoning),
            _ => None,
        }
    }
}

/// Latest decoded position fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location {
    /// Fix quality from the text channel
    pub fix: FixType,
    /// UTC time of the fix as Unix epoch seconds, when date/time were valid
    pub utc_epoch: Option<i64>,
    /// Latitude, degrees x 1e7
    pub latitude_e7: i32,
    /// Longitude, degrees x 1e7
    pub longitude_e7: i32,
    /// Height above mean sea level in mm; only reported on a full 3D fix
    pub altitude_mm: Option<i32>,
    /// Horizontal accuracy estimate in mm
    pub radius_mm: u32,
    /// Ground speed in mm/s
    pub speed_mm_s: i32,
    /// High-precision horizontal accuracy, 0.1 mm units
    pub h_accuracy_tmm: u32,
    /// High-precision vertical accuracy, 0.1 mm units
    pub v_accuracy_tmm: u32,
    /// Satellites used in the solution
    pub satellites: u8,
}

impl Location {
    /// Latitude in degrees
    pub fn latitude_deg(&self) -> f64 {
        self.latitude_e7 as f64 * 1e-7
    }

    /// Longitude in degrees
    pub fn longitude_deg(&self) -> f64 {
        self.longitude_e7 as f64 * 1e-7
    }
}

/// Sensor-to-vehicle mounting angles in centidegrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlignmentValues {
    /// Yaw, [0, 36000]
    pub yaw_cd: u32,
    /// Pitch, [-9000, 9000]
    pub pitch_cd: i16,
    /// Roll, [-18000, 18000]
    pub roll_cd: i16,
}

impl AlignmentValues {
    /// Whether all three axes are inside the permitted ranges.
    ///
    /// Values failing this check must never be persisted or pushed to the
    /// receiver as final calibration.
    pub fn is_within_range(&self) -> bool {
        self.yaw_cd <= 36_000
            && (-9_000..=9_000).contains(&self.pitch_cd)
            && (-18_000..=18_000).contains(&self.roll_cd)
    }
}

/// Alignment engine status reported by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlignmentStatus {
    /// Fixed angles in use (manual mode, or auto before convergence check)
    UserDefined,
    /// Estimating roll and pitch
    RollPitchCalibrating,
    /// Estimating roll, pitch and yaw
    RollPitchYawCalibrating,
    /// Coarse alignment reached
    CoarseAlignment,
    /// Fine alignment reached
    FineAlignment,
}

impl AlignmentStatus {
    /// Decode the 3-bit status field from the alignment message
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(AlignmentStatus::UserDefined),
            1 => Some(AlignmentStatus::RollPitchCalibrating),
            2 => Some(AlignmentStatus::RollPitchYawCalibrating),
            3 => Some(AlignmentStatus::CoarseAlignment),
            4 => Some(AlignmentStatus::FineAlignment),
            _ => None,
        }
    }

    /// Whether the alignment engine has converged
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            AlignmentStatus::CoarseAlignment | AlignmentStatus::FineAlignment
        )
    }
}

bitflags! {
    /// Alignment engine error bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AlignmentErrors: u8 {
        /// Tilt (roll/pitch) estimation error
        const TILT = 0x01;
        /// Yaw estimation error
        const YAW = 0x02;
        /// Mounting angles out of the expected envelope
        const ANGLE = 0x04;
    }
}

/// Latest alignment info from the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentData {
    /// Automatic mount alignment active on the receiver
    pub auto_enabled: bool,
    /// Engine status
    pub status: AlignmentStatus,
    /// Engine error bits
    pub errors: AlignmentErrors,
    /// Current mounting angles
    pub angles: AlignmentValues,
}

/// Sensor fusion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FusionMode {
    /// Fusion filter initializing
    Initializing,
    /// GNSS and sensor data fused
    Active,
    /// Fusion temporarily suspended
    Suspended,
    /// Fusion disabled
    Disabled,
}

impl FusionMode {
    /// Decode the fusion-mode byte from the status message
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(FusionMode::Initializing),
            1 => Some(FusionMode::Active),
            2 => Some(FusionMode::Suspended),
            3 => Some(FusionMode::Disabled),
            _ => None,
        }
    }
}

bitflags! {
    /// Per-sensor fault bits from the fusion status message
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SensorFaults: u8 {
        /// Bad measurement data
        const BAD_MEASUREMENT = 0x01;
        /// Bad measurement timestamp
        const BAD_TIME_TAG = 0x02;
        /// Measurements missing
        const MISSING_MEASUREMENT = 0x04;
        /// Measurements noisier than expected
        const NOISY_MEASUREMENT = 0x08;
    }
}

/// One sensor entry from the fusion status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionSensor {
    /// Vendor sensor-type code
    pub sensor_type: u8,
    /// Sensor data used in the solution
    pub used: bool,
    /// Sensor set up and ready
    pub ready: bool,
    /// Calibration progress, 0 (none) to 3 (calibrated)
    pub calib_status: u8,
    /// Observation frequency in Hz
    pub freq_hz: u8,
    /// Fault bits
    pub faults: SensorFaults,
}

/// Fusion filter status with per-sensor detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionStatus {
    /// Filter mode
    pub mode: FusionMode,
    /// Per-sensor entries, bounded
    pub sensors: heapless::Vec<FusionSensor, MAX_ESF_SENSORS>,
}

bitflags! {
    /// Validity bits for the vehicle dynamics message
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DynamicsValidity: u8 {
        const X_ANG_RATE = 0x01;
        const Y_ANG_RATE = 0x02;
        const Z_ANG_RATE = 0x04;
        const X_ACCEL = 0x08;
        const Y_ACCEL = 0x10;
        const Z_ACCEL = 0x20;
    }
}

/// Compensated vehicle dynamics from the inertial solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VehicleDynamics {
    /// Which axes carry valid data
    pub validity: DynamicsValidity,
    /// Angular rates, milli-degrees/s
    pub ang_rate_mdeg_s: [i32; 3],
    /// Accelerations, cm/s^2
    pub accel_cm_s2: [i32; 3],
}

/// Dead-reckoning calibration mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationMode {
    /// Caller supplies mounting angles
    Manual,
    /// Receiver estimates mounting angles
    #[default]
    Auto,
}

/// Correction-data source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CorrectionSource {
    /// Corrections injected over the network
    #[default]
    Ip,
    /// Corrections from the satellite L-band receiver
    LBand,
}

/// Receiver dynamic platform model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DynamicsModel {
    /// Portable (receiver default)
    Portable,
    /// Stationary
    Stationary,
    /// Pedestrian
    Pedestrian,
    /// Road vehicle
    #[default]
    Automotive,
    /// Marine
    Sea,
}

impl DynamicsModel {
    /// Configuration value expected by the receiver
    pub fn as_config_value(&self) -> u8 {
        match self {
            DynamicsModel::Portable => 0,
            DynamicsModel::Stationary => 2,
            DynamicsModel::Pedestrian => 3,
            DynamicsModel::Automotive => 4,
            DynamicsModel::Sea => 5,
        }
    }
}

/// Per-device configuration attached on start
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GnssConfig {
    /// Bus parameters for the board layer
    pub transport: TransportConfig,
    /// Correction-data source
    pub correction_source: CorrectionSource,
    /// Dead reckoning requested
    pub dr_enabled: bool,
    /// Calibration mode when dead reckoning is enabled
    pub calibration_mode: CalibrationMode,
    /// Caller-supplied mounting angles for manual calibration
    pub alignment: AlignmentValues,
    /// Dynamic platform model pushed with the dead-reckoning settings
    pub dynamics_model: DynamicsModel,
    /// Stored decryption-key frame, replayed on controlled restart
    pub decryption_keys: heapless::Vec<u8, MAX_KEY_FRAME_LEN>,
    /// Mirror raw receiver traffic into the shared log ring
    pub raw_logging: bool,
}
