//! Per-profile device record and lifecycle state machine
//!
//! One `GnssDevice` per managed receiver. The FSM is driven by the
//! application calling `tick` once per loop iteration; each call performs at
//! most one state's work. The only blocking section is the initial open
//! retry loop, which is bounded by [`OPEN_TIMEOUT_MS`].

use crate::core::traits::time::Clock;
use crate::gnss::calibration::{self, PersistState};
use crate::gnss::nmea::FixTracker;
use crate::gnss::rawlog::RawLogBuffer;
use crate::gnss::store::CalibrationStore;
use crate::gnss::types::{
    AlignmentData, AlignmentValues, CalibrationMode, CorrectionSource, DeviceState, FusionStatus,
    GnssConfig, GnssError, Location, TickStatus, VehicleDynamics, MAX_KEY_FRAME_LEN,
};
use crate::gnss::ubx::{self, keys, CfgItem};
use crate::gnss::watchdog::Watchdog;
use crate::platform::traits::{ChannelKind, KeyValueStore, SessionHandle, TransportInterface};
use crate::{log_debug, log_error, log_info, log_warn};
use core::fmt::Write;

/// Budget for the synchronous open retry loop
pub const OPEN_TIMEOUT_MS: u64 = 60_000;

/// Pacing between open attempts
pub const OPEN_RETRY_DELAY_MS: u32 = 50;

/// Grace period between a controlled restart and the re-open
pub const RESTART_GRACE_MS: u64 = 2_000;

/// Generic receiver settings pushed during bring-up: high-precision NMEA
/// plus periodic output of every message the dispatcher consumes.
const LOCATION_SETTINGS: [CfgItem; 6] = [
    CfgItem {
        key: keys::NMEA_HIGHPREC,
        value: 1,
    },
    CfgItem {
        key: keys::MSGOUT_NAV_PVT_I2C,
        value: 1,
    },
    CfgItem {
        key: keys::MSGOUT_NAV_HPPOSLLH_I2C,
        value: 1,
    },
    CfgItem {
        key: keys::MSGOUT_ESF_ALG_I2C,
        value: 1,
    },
    CfgItem {
        key: keys::MSGOUT_ESF_STATUS_I2C,
        value: 1,
    },
    CfgItem {
        key: keys::MSGOUT_ESF_INS_I2C,
        value: 1,
    },
];

/// Independent per-profile status flags.
///
/// Written by both the polled FSM and the dispatcher; the registry is
/// expected to sit behind one `SharedState` mutex, so every access here is
/// already serialized.
#[derive(Debug, Default)]
pub(crate) struct Flags {
    pub configured: bool,
    /// Dead reckoning currently active on the receiver
    pub dr_active: bool,
    /// First open after configuration routes through a controlled restart
    pub came_from_configuration: bool,
    pub stop_requested: bool,
    pub restart_requested: bool,
    /// One-shot manual push requested by the calibration manager
    pub run_manual_calibration: bool,
    pub persist: PersistState,
    pub is_calibrated: bool,
    pub location_refreshed: bool,
    pub location_available: bool,
    pub error: bool,
}

/// One managed receiver profile
pub struct GnssDevice<T: TransportInterface, K: KeyValueStore> {
    profile: u8,
    transport: T,
    store: CalibrationStore<K>,
    config: GnssConfig,
    state: DeviceState,
    previous: DeviceState,
    /// Monotonic stamp of the last transition, for elapsed-time gates
    state_entered_us: u64,
    retries: u32,
    pub(crate) flags: Flags,
    pub(crate) watchdog: Watchdog,
    pub(crate) binary_session: Option<SessionHandle>,
    pub(crate) text_session: Option<SessionHandle>,
    pub(crate) fix_tracker: FixTracker,
    pub(crate) location: Location,
    pub(crate) alignment: Option<AlignmentData>,
    pub(crate) fusion: Option<FusionStatus>,
    pub(crate) dynamics: Option<VehicleDynamics>,
    /// Stored values promoted to a one-shot manual push
    manual_override: Option<AlignmentValues>,
    /// Mode actually pushed to the receiver, for status classification
    pub(crate) active_mode: CalibrationMode,
}

impl<T: TransportInterface, K: KeyValueStore> GnssDevice<T, K> {
    pub(crate) fn new(profile: u8, transport: T, store: K) -> Self {
        Self {
            profile,
            transport,
            store: CalibrationStore::new(store),
            config: GnssConfig::default(),
            state: DeviceState::Unconfigured,
            previous: DeviceState::Unconfigured,
            state_entered_us: 0,
            retries: 0,
            flags: Flags::default(),
            watchdog: Watchdog::new(),
            binary_session: None,
            text_session: None,
            fix_tracker: FixTracker::new(),
            location: Location::default(),
            alignment: None,
            fusion: None,
            dynamics: None,
            manual_override: None,
            active_mode: CalibrationMode::Auto,
        }
    }

    /// Profile id this device is registered under
    pub fn profile(&self) -> u8 {
        self.profile
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn previous_state(&self) -> DeviceState {
        self.previous
    }

    pub(crate) fn config(&self) -> &GnssConfig {
        &self.config
    }

    /// Attach configuration; the next tick starts bring-up.
    pub fn start(&mut self, config: GnssConfig) -> Result<(), GnssError> {
        if self.flags.configured {
            return Err(GnssError::Busy);
        }
        self.config = config;
        self.flags.configured = true;
        self.flags.came_from_configuration = true;
        Ok(())
    }

    /// Request an asynchronous stop, honored at the next decision point.
    pub fn request_stop(&mut self) -> Result<(), GnssError> {
        if !self.flags.configured {
            return Err(GnssError::NotReady);
        }
        self.flags.stop_requested = true;
        Ok(())
    }

    /// Request a controlled restart, honored while `DeviceReady`.
    pub fn request_restart(&mut self) -> Result<(), GnssError> {
        if !self.flags.configured {
            return Err(GnssError::NotReady);
        }
        self.flags.restart_requested = true;
        Ok(())
    }

    /// Turn dead reckoning on; honored only while `DeviceReady`.
    pub fn enable_dead_reckoning(&mut self) -> Result<(), GnssError> {
        if self.state != DeviceState::DeviceReady {
            return Err(GnssError::NotReady);
        }
        self.config.dr_enabled = true;
        Ok(())
    }

    /// Turn dead reckoning off; honored only while `DeviceReady`.
    pub fn disable_dead_reckoning(&mut self) -> Result<(), GnssError> {
        if self.state != DeviceState::DeviceReady {
            return Err(GnssError::NotReady);
        }
        self.config.dr_enabled = false;
        Ok(())
    }

    /// Whether dead reckoning is active on the receiver
    pub fn is_dr_enabled(&self) -> bool {
        self.flags.dr_active
    }

    /// Whether the mounting alignment is considered calibrated
    pub fn is_dr_calibrated(&self) -> bool {
        self.flags.is_calibrated
    }

    /// Latest decoded fix
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Whether a fix arrived since the last `consume_location`
    pub fn has_new_location(&self) -> bool {
        self.flags.location_refreshed
    }

    /// Take the latest fix, clearing the refreshed flag
    pub fn consume_location(&mut self) -> Location {
        self.flags.location_refreshed = false;
        self.location
    }

    /// Latest alignment info reported by the receiver
    pub fn alignment_info(&self) -> Option<AlignmentData> {
        self.alignment
    }

    /// Latest fusion status reported by the receiver
    pub fn fusion_status(&self) -> Option<&FusionStatus> {
        self.fusion.as_ref()
    }

    /// Latest compensated vehicle dynamics
    pub fn vehicle_dynamics(&self) -> Option<VehicleDynamics> {
        self.dynamics
    }

    /// Erase the persisted calibration group
    pub fn delete_calibrations(&mut self) -> Result<(), GnssError> {
        self.store.erase()
    }

    /// Send a pre-framed command straight to the receiver
    pub fn send_formatted_command(&mut self, bytes: &[u8]) -> Result<(), GnssError> {
        if !self.transport.is_open() {
            return Err(GnssError::NotReady);
        }
        self.transport.send_frame(bytes)?;
        Ok(())
    }

    /// Inject correction data (raw passthrough)
    pub fn send_correction_data(&mut self, bytes: &[u8]) -> Result<(), GnssError> {
        self.send_formatted_command(bytes)
    }

    /// Inject decryption keys, retaining them for replay after a restart
    pub fn send_decryption_keys(&mut self, bytes: &[u8]) -> Result<(), GnssError> {
        if bytes.len() > MAX_KEY_FRAME_LEN {
            return Err(GnssError::FrameTooLarge);
        }
        self.config.decryption_keys.clear();
        self.config
            .decryption_keys
            .extend_from_slice(bytes)
            .map_err(|_| GnssError::FrameTooLarge)?;
        if self.transport.is_open() {
            self.send_formatted_command(bytes)?;
        }
        Ok(())
    }

    /// Format the current fix as a maps URL, if a fix is available
    pub fn gmaps_location(&self) -> Option<heapless::String<64>> {
        if !self.flags.location_available {
            return None;
        }
        let mut url: heapless::String<64> = heapless::String::new();
        url.push_str("https://maps.google.com/?q=").ok()?;
        write_deg_e7(&mut url, self.location.latitude_e7).ok()?;
        url.push(',').ok()?;
        write_deg_e7(&mut url, self.location.longitude_e7).ok()?;
        Some(url)
    }

    // ========================================================================
    // Lifecycle FSM
    // ========================================================================

    /// Drive the lifecycle FSM one state forward.
    pub fn tick<C: Clock>(&mut self, clock: &mut C, rawlog: &mut RawLogBuffer) -> TickStatus {
        match self.state {
            DeviceState::Unconfigured => {
                if self.flags.configured {
                    self.transition(DeviceState::EnableLogging, clock.now_us());
                    TickStatus::Busy
                } else {
                    TickStatus::Ok
                }
            }

            DeviceState::EnableLogging => {
                if self.config.raw_logging {
                    rawlog.enable(self.profile);
                    log_info!("gnss{}: raw logging active", self.profile);
                }
                self.transition(DeviceState::DeviceOpen, clock.now_us());
                TickStatus::Busy
            }

            DeviceState::DeviceOpen => self.tick_open(clock),

            DeviceState::WatchdogInit => {
                let now = clock.now_us();
                self.watchdog.arm(now);
                self.transition(DeviceState::SetLocationSettings, now);
                TickStatus::Busy
            }

            DeviceState::SetLocationSettings => match self.push_items(&LOCATION_SETTINGS) {
                Ok(()) => {
                    self.transition(DeviceState::SetDecryptionKeys, clock.now_us());
                    TickStatus::Busy
                }
                Err(e) => self.fail_config(clock.now_us(), "location settings", e),
            },

            DeviceState::SetDecryptionKeys => {
                if self.config.decryption_keys.is_empty() {
                    self.transition(DeviceState::SetCorrectionSource, clock.now_us());
                    return TickStatus::Busy;
                }
                let keys_frame: heapless::Vec<u8, MAX_KEY_FRAME_LEN> =
                    self.config.decryption_keys.clone();
                match self.transport.send_frame(&keys_frame) {
                    Ok(()) => {
                        self.transition(DeviceState::SetCorrectionSource, clock.now_us());
                        TickStatus::Busy
                    }
                    Err(e) => self.fail_config(clock.now_us(), "decryption keys", e.into()),
                }
            }

            DeviceState::SetCorrectionSource => {
                let value = match self.config.correction_source {
                    CorrectionSource::Ip => 0,
                    CorrectionSource::LBand => 1,
                };
                match self.push_items(&[CfgItem {
                    key: keys::SPARTN_USE_SOURCE,
                    value,
                }]) {
                    Ok(()) => {
                        self.transition(DeviceState::StartReceivers, clock.now_us());
                        TickStatus::Busy
                    }
                    Err(e) => self.fail_config(clock.now_us(), "correction source", e),
                }
            }

            DeviceState::StartReceivers => match self.start_channels() {
                Ok(()) => {
                    self.transition(DeviceState::InitStore, clock.now_us());
                    TickStatus::Busy
                }
                Err(e) => self.fail_config(clock.now_us(), "async receivers", e),
            },

            DeviceState::InitStore => match self.store.init(self.profile) {
                Ok(()) => {
                    let next = if self.config.dr_enabled {
                        DeviceState::DeadReckoningInit
                    } else {
                        self.enter_ready();
                        DeviceState::DeviceReady
                    };
                    self.transition(next, clock.now_us());
                    TickStatus::Busy
                }
                Err(e) => self.fail_config(clock.now_us(), "calibration store", e),
            },

            DeviceState::DeadReckoningInit => {
                match self.push_items(&calibration::dr_settings_items(self.config.dynamics_model)) {
                    Ok(()) => {
                        let next = if self.flags.run_manual_calibration
                            || self.config.calibration_mode == CalibrationMode::Manual
                        {
                            DeviceState::ManualCalibration
                        } else {
                            DeviceState::AutoCalibration
                        };
                        self.transition(next, clock.now_us());
                        TickStatus::Busy
                    }
                    Err(e) => self.fail_config(clock.now_us(), "dead reckoning settings", e),
                }
            }

            DeviceState::ManualCalibration => self.tick_manual_calibration(clock.now_us()),

            DeviceState::AutoCalibration => self.tick_auto_calibration(clock.now_us()),

            DeviceState::DeadReckoningStart => {
                match self.push_items(&calibration::fusion_enable_items()) {
                    Ok(()) => {
                        self.flags.dr_active = true;
                        self.enter_ready();
                        self.transition(DeviceState::DeviceReady, clock.now_us());
                        TickStatus::Busy
                    }
                    Err(e) => self.fail_config(clock.now_us(), "sensor fusion", e),
                }
            }

            DeviceState::DeviceReady => self.tick_ready(clock.now_us()),

            DeviceState::PersistCalibration => {
                self.tick_persist();
                self.transition(DeviceState::DeviceReady, clock.now_us());
                TickStatus::Busy
            }

            DeviceState::DeviceRestart => {
                self.tick_restart();
                self.transition(DeviceState::Wait, clock.now_us());
                TickStatus::Busy
            }

            DeviceState::Wait => {
                let now = clock.now_us();
                if now.saturating_sub(self.state_entered_us) >= RESTART_GRACE_MS * 1000 {
                    match self.previous {
                        DeviceState::DeviceRestart => {
                            self.transition(DeviceState::DeviceOpen, now);
                        }
                        other => {
                            log_error!("gnss{}: wait after unexpected state {:?}", self.profile, other);
                            self.flags.error = true;
                            self.transition(DeviceState::Error, now);
                            return TickStatus::Error;
                        }
                    }
                }
                TickStatus::Busy
            }

            DeviceState::DeviceStop => {
                self.tick_stop(rawlog);
                self.transition(DeviceState::Unconfigured, clock.now_us());
                TickStatus::Ok
            }

            DeviceState::Timeout | DeviceState::Error => {
                self.retries = 0;
                if self.flags.stop_requested {
                    self.transition(DeviceState::DeviceStop, clock.now_us());
                }
                TickStatus::Error
            }
        }
    }

    /// Bounded synchronous open retry loop.
    fn tick_open<C: Clock>(&mut self, clock: &mut C) -> TickStatus {
        let deadline = clock.now_us().saturating_add(OPEN_TIMEOUT_MS * 1000);
        loop {
            match self.transport.open(&self.config.transport) {
                Ok(()) => {
                    self.retries = 0;
                    let next = if self.flags.came_from_configuration {
                        // Settings pushed once must survive a controlled
                        // restart, so the first open routes through one.
                        self.flags.came_from_configuration = false;
                        DeviceState::DeviceRestart
                    } else {
                        DeviceState::WatchdogInit
                    };
                    self.transition(next, clock.now_us());
                    return TickStatus::Busy;
                }
                Err(e) => {
                    self.retries = self.retries.saturating_add(1);
                    if clock.now_us() >= deadline {
                        log_error!(
                            "gnss{}: open failed after {} attempts: {:?}",
                            self.profile,
                            self.retries,
                            e
                        );
                        self.transition(DeviceState::Timeout, clock.now_us());
                        return TickStatus::Error;
                    }
                    clock.delay_ms(OPEN_RETRY_DELAY_MS);
                }
            }
        }
    }

    fn tick_manual_calibration(&mut self, now_us: u64) -> TickStatus {
        let values = match self.manual_override.take() {
            Some(stored) => stored,
            None => self.config.alignment,
        };
        if !values.is_within_range() {
            return self.fail_config(now_us, "manual alignment", GnssError::CalibrationOutOfRange);
        }
        match self.push_items(&calibration::manual_alignment_items(&values)) {
            Ok(()) => {
                self.flags.run_manual_calibration = false;
                self.active_mode = CalibrationMode::Manual;
                self.transition(DeviceState::DeadReckoningStart, now_us);
                TickStatus::Busy
            }
            Err(e) => self.fail_config(now_us, "manual alignment", e),
        }
    }

    fn tick_auto_calibration(&mut self, now_us: u64) -> TickStatus {
        // A pending one-shot manual push takes priority over reconverging
        if self.flags.run_manual_calibration {
            self.transition(DeviceState::ManualCalibration, now_us);
            return TickStatus::Busy;
        }

        match self.store.load() {
            Ok(stored) if calibration::stored_is_usable(&stored) => {
                // Prior convergence becomes a manual override; the next tick
                // pushes it without re-deriving defaults.
                self.manual_override = Some(stored);
                self.flags.run_manual_calibration = true;
                log_info!("gnss{}: stored calibration valid, switching to manual", self.profile);
                TickStatus::Busy
            }
            other => {
                if let Err(e) = other {
                    // Store trouble never escalates; the receiver can still
                    // converge on its own.
                    log_warn!("gnss{}: calibration load failed: {:?}", self.profile, e);
                }
                match self.push_items(&calibration::auto_alignment_items()) {
                    Ok(()) => {
                        self.active_mode = CalibrationMode::Auto;
                        self.transition(DeviceState::DeadReckoningStart, now_us);
                        TickStatus::Busy
                    }
                    Err(e) => self.fail_config(now_us, "auto alignment", e),
                }
            }
        }
    }

    /// Steady state: dispatch stop/restart/reconfiguration/persistence, in
    /// that priority order.
    fn tick_ready(&mut self, now_us: u64) -> TickStatus {
        if self.flags.error {
            self.transition(DeviceState::Error, now_us);
            return TickStatus::Error;
        }
        if self.flags.stop_requested {
            self.transition(DeviceState::DeviceStop, now_us);
            return TickStatus::Busy;
        }
        if self.flags.restart_requested || self.watchdog.is_timed_out(now_us) {
            if self.flags.restart_requested {
                log_info!("gnss{}: restart requested", self.profile);
            } else {
                log_warn!("gnss{}: watchdog expired, restarting", self.profile);
            }
            self.flags.restart_requested = false;
            self.transition(DeviceState::DeviceRestart, now_us);
            return TickStatus::Busy;
        }
        if self.config.dr_enabled != self.flags.dr_active {
            let next = if self.config.dr_enabled {
                DeviceState::DeadReckoningInit
            } else {
                // Disabling fusion needs a clean receiver state
                DeviceState::DeviceRestart
            };
            self.transition(next, now_us);
            return TickStatus::Busy;
        }
        if self.flags.persist == PersistState::Pending {
            self.transition(DeviceState::PersistCalibration, now_us);
            return TickStatus::Busy;
        }
        TickStatus::Ok
    }

    /// Write converged alignment values; failure is reported but never
    /// changes the course of the FSM.
    fn tick_persist(&mut self) {
        let Some(alignment) = self.alignment else {
            self.flags.persist = PersistState::Idle;
            return;
        };
        match self.store.save(&alignment.angles) {
            Ok(()) => {
                self.flags.persist = PersistState::Done;
                log_info!("gnss{}: calibration persisted", self.profile);
            }
            Err(e) => {
                // Re-arm so a later convergence report can retry
                self.flags.persist = PersistState::Idle;
                log_warn!("gnss{}: calibration persist failed: {:?}", self.profile, e);
            }
        }
    }

    /// Controlled restart: reset command, session teardown, close.
    fn tick_restart(&mut self) {
        match ubx::encode_reset() {
            Ok(frame) => {
                if let Err(e) = self.transport.send_frame(&frame) {
                    log_warn!("gnss{}: reset command failed: {:?}", self.profile, e);
                }
            }
            Err(e) => log_warn!("gnss{}: reset encode failed: {:?}", self.profile, e),
        }
        self.stop_channels();
        self.watchdog.disarm();
        if let Err(e) = self.transport.close() {
            log_warn!("gnss{}: close failed: {:?}", self.profile, e);
        }
        self.flags.dr_active = false;
        self.flags.is_calibrated = false;
        self.fix_tracker.reset();
    }

    /// Full teardown back to `Unconfigured`.
    fn tick_stop(&mut self, rawlog: &mut RawLogBuffer) {
        self.stop_channels();
        self.watchdog.disarm();
        if let Err(e) = self.transport.close() {
            log_warn!("gnss{}: close failed: {:?}", self.profile, e);
        }
        rawlog.disable(self.profile);

        self.config = GnssConfig::default();
        self.flags = Flags::default();
        self.location = Location::default();
        self.alignment = None;
        self.fusion = None;
        self.dynamics = None;
        self.manual_override = None;
        self.active_mode = CalibrationMode::Auto;
        self.fix_tracker.reset();
        self.retries = 0;
        log_info!("gnss{}: stopped", self.profile);
    }

    fn enter_ready(&mut self) {
        log_info!("gnss{}: device ready", self.profile);
    }

    /// Start both receive sessions; already-running sessions are left alone.
    fn start_channels(&mut self) -> Result<(), GnssError> {
        if self.binary_session.is_none() {
            self.binary_session = Some(self.transport.start_receive(ChannelKind::Binary)?);
        }
        if self.text_session.is_none() {
            self.text_session = Some(self.transport.start_receive(ChannelKind::Text)?);
        }
        Ok(())
    }

    /// Stop both receive sessions; sessions not running are skipped.
    fn stop_channels(&mut self) {
        if let Some(handle) = self.binary_session.take() {
            if let Err(e) = self.transport.stop_receive(handle) {
                log_warn!("gnss{}: binary session stop failed: {:?}", self.profile, e);
            }
        }
        if let Some(handle) = self.text_session.take() {
            if let Err(e) = self.transport.stop_receive(handle) {
                log_warn!("gnss{}: text session stop failed: {:?}", self.profile, e);
            }
        }
    }

    fn push_items(&mut self, items: &[CfgItem]) -> Result<(), GnssError> {
        let frame = ubx::encode_cfg_valset(items)?;
        self.transport.send_frame(&frame)?;
        Ok(())
    }

    fn fail_config(&mut self, now_us: u64, what: &str, e: GnssError) -> TickStatus {
        log_error!("gnss{}: {} configuration failed: {:?}", self.profile, what, e);
        self.flags.error = true;
        self.transition(DeviceState::Error, now_us);
        TickStatus::Error
    }

    fn transition(&mut self, next: DeviceState, now_us: u64) {
        log_debug!("gnss{}: {:?} -> {:?}", self.profile, self.state, next);
        self.previous = self.state;
        self.state = next;
        self.state_entered_us = now_us;
    }
}

/// Write a 1e-7 fixed-point value as decimal degrees
fn write_deg_e7<W: Write>(out: &mut W, value: i32) -> core::fmt::Result {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    write!(out, "{}{}.{:07}", sign, abs / 10_000_000, abs % 10_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::time::MockClock;
    use crate::platform::mock::{MockStore, MockTransport};

    fn device() -> GnssDevice<MockTransport, MockStore> {
        GnssDevice::new(0, MockTransport::new(), MockStore::new())
    }

    fn esf_alg_frame(flags: u8, yaw: u32, pitch: i16, roll: i16) -> std::vec::Vec<u8> {
        let mut payload = [0u8; 16];
        payload[5] = flags;
        payload[8..12].copy_from_slice(&yaw.to_le_bytes());
        payload[12..14].copy_from_slice(&pitch.to_le_bytes());
        payload[14..16].copy_from_slice(&roll.to_le_bytes());
        ubx::encode_frame(ubx::CLASS_ESF, ubx::ID_ESF_ALG, &payload)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_start_rejects_double_configuration() {
        let mut dev = device();
        dev.start(GnssConfig::default()).unwrap();
        assert_eq!(dev.start(GnssConfig::default()), Err(GnssError::Busy));
    }

    #[test]
    fn test_stop_requires_configuration() {
        let mut dev = device();
        assert_eq!(dev.request_stop(), Err(GnssError::NotReady));
    }

    #[test]
    fn test_dead_reckoning_toggle_requires_ready() {
        let mut dev = device();
        assert_eq!(dev.enable_dead_reckoning(), Err(GnssError::NotReady));
        assert_eq!(dev.disable_dead_reckoning(), Err(GnssError::NotReady));
    }

    #[test]
    fn test_gmaps_location_formatting() {
        let mut dev = device();
        assert!(dev.gmaps_location().is_none());

        dev.location.latitude_e7 = 379_813_755;
        dev.location.longitude_e7 = -236_569_273;
        dev.flags.location_available = true;
        let url = dev.gmaps_location().unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.google.com/?q=37.9813755,-23.6569273"
        );
    }

    #[test]
    fn test_send_correction_data_requires_open_transport() {
        let mut dev = device();
        assert_eq!(
            dev.send_correction_data(&[0xD3, 0x00]),
            Err(GnssError::NotReady)
        );
    }

    #[test]
    fn test_decryption_keys_retained_without_open_transport() {
        let mut dev = device();
        dev.send_decryption_keys(&[0xB5, 0x62, 0x06, 0x8A]).unwrap();
        assert_eq!(dev.config().decryption_keys.as_slice(), &[0xB5, 0x62, 0x06, 0x8A]);
    }

    #[test]
    fn test_configured_keys_pushed_during_bring_up() {
        let keys_frame = [0xB5, 0x62, 0x06, 0x8A, 0x01, 0x00];
        let mut dev = device();
        let mut config = GnssConfig::default();
        config.decryption_keys.extend_from_slice(&keys_frame).unwrap();
        dev.start(config).unwrap();

        let mut clock = MockClock::new();
        let mut rawlog = RawLogBuffer::new();
        for _ in 0..200 {
            dev.tick(&mut clock, &mut rawlog);
            if dev.state() == DeviceState::DeviceReady {
                break;
            }
            clock.advance_ms(100);
        }
        assert_eq!(dev.state(), DeviceState::DeviceReady);

        // Keys go out exactly once, during the post-restart configuration
        let pushes = dev
            .transport
            .sent_frames()
            .iter()
            .filter(|f| f.as_slice() == keys_frame)
            .count();
        assert_eq!(pushes, 1);
    }

    #[test]
    fn test_persist_failure_rearms_for_retry() {
        let mut inner = MockStore::new();
        inner.fail_puts_for("yaw");
        let mut dev = GnssDevice::new(0, MockTransport::new(), inner);
        dev.store.init(0).unwrap();
        dev.state = DeviceState::DeviceReady;
        dev.flags.configured = true;
        dev.binary_session = Some(SessionHandle(1));
        dev.active_mode = CalibrationMode::Auto;

        let mut clock = MockClock::new();
        let mut rawlog = RawLogBuffer::new();

        dev.on_binary_frame(0, &esf_alg_frame(0x01 | (4 << 1), 27_000, -500, 250), &mut rawlog);
        assert_eq!(dev.flags.persist, PersistState::Pending);

        assert_eq!(dev.tick(&mut clock, &mut rawlog), TickStatus::Busy);
        assert_eq!(dev.state(), DeviceState::PersistCalibration);
        dev.tick(&mut clock, &mut rawlog);
        assert_eq!(dev.state(), DeviceState::DeviceReady);
        // The failed write re-arms instead of latching Done
        assert_eq!(dev.flags.persist, PersistState::Idle);

        // The next convergence report schedules another attempt
        dev.on_binary_frame(0, &esf_alg_frame(0x01 | (4 << 1), 27_100, -500, 250), &mut rawlog);
        assert_eq!(dev.flags.persist, PersistState::Pending);
        assert_eq!(dev.tick(&mut clock, &mut rawlog), TickStatus::Busy);
        assert_eq!(dev.state(), DeviceState::PersistCalibration);
    }
}
