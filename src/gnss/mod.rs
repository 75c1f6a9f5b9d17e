//! GNSS receiver orchestration
//!
//! Everything above the platform traits: the wire codec, the message
//! dispatcher, dead-reckoning calibration, the per-device lifecycle FSM,
//! and the registry that the application drives.

pub mod calibration;
pub mod device;
pub mod dispatcher;
pub mod nmea;
pub mod rawlog;
pub mod registry;
pub mod store;
pub mod types;
pub mod ubx;
pub mod watchdog;

pub use registry::GnssRegistry;
pub use types::{
    AlignmentData, AlignmentStatus, AlignmentValues, CalibrationMode, CorrectionSource,
    DeviceState, DynamicsModel, FixType, FusionMode, FusionStatus, GnssConfig, GnssError,
    Location, TickStatus, VehicleDynamics,
};

/// Maximum number of receiver profiles managed by one registry
pub const MAX_DEVICES: usize = 2;
