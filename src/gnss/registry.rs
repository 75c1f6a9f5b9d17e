//! Receiver registry
//!
//! The application-facing surface: a fixed-capacity table of device
//! profiles, the shared clock that drives their FSMs, and the shared raw
//! log ring. Every operation validates the profile id first; the registry
//! is meant to live behind a `SharedState` mutex so the polled FSM and the
//! receive paths serialize on it.

use crate::core::traits::time::Clock;
use crate::gnss::device::GnssDevice;
use crate::gnss::rawlog::RawLogBuffer;
use crate::gnss::types::{
    AlignmentData, DeviceState, FusionStatus, GnssConfig, GnssError, Location, TickStatus,
    VehicleDynamics,
};
use crate::gnss::MAX_DEVICES;
use crate::platform::traits::{KeyValueStore, LogSink, TransportInterface};
use heapless::Vec;

/// Registry of managed receiver profiles
pub struct GnssRegistry<T, K, C>
where
    T: TransportInterface,
    K: KeyValueStore,
    C: Clock,
{
    devices: Vec<GnssDevice<T, K>, MAX_DEVICES>,
    clock: C,
    rawlog: RawLogBuffer,
}

impl<T, K, C> GnssRegistry<T, K, C>
where
    T: TransportInterface,
    K: KeyValueStore,
    C: Clock,
{
    pub fn new(clock: C) -> Self {
        Self {
            devices: Vec::new(),
            clock,
            rawlog: RawLogBuffer::new(),
        }
    }

    /// Register a new profile around its transport and store.
    ///
    /// Returns the profile id to use with every other operation.
    pub fn add_profile(&mut self, transport: T, store: K) -> Result<u8, GnssError> {
        let profile = self.devices.len() as u8;
        self.devices
            .push(GnssDevice::new(profile, transport, store))
            .map_err(|_| GnssError::RegistryFull)?;
        Ok(profile)
    }

    /// Number of registered profiles
    pub fn profile_count(&self) -> usize {
        self.devices.len()
    }

    fn device(&self, profile: u8) -> Result<&GnssDevice<T, K>, GnssError> {
        self.devices
            .get(profile as usize)
            .ok_or(GnssError::InvalidProfile)
    }

    fn device_mut(&mut self, profile: u8) -> Result<&mut GnssDevice<T, K>, GnssError> {
        self.devices
            .get_mut(profile as usize)
            .ok_or(GnssError::InvalidProfile)
    }

    /// Attach configuration; bring-up starts on the next tick.
    pub fn start_device(&mut self, profile: u8, config: GnssConfig) -> Result<(), GnssError> {
        self.device_mut(profile)?.start(config)
    }

    /// Request an asynchronous stop.
    pub fn stop_device(&mut self, profile: u8) -> Result<(), GnssError> {
        self.device_mut(profile)?.request_stop()
    }

    /// Request a controlled restart.
    pub fn restart_device(&mut self, profile: u8) -> Result<(), GnssError> {
        self.device_mut(profile)?.request_restart()
    }

    /// Drive one profile's FSM one step forward.
    pub fn tick(&mut self, profile: u8) -> Result<TickStatus, GnssError> {
        let idx = profile as usize;
        if idx >= self.devices.len() {
            return Err(GnssError::InvalidProfile);
        }
        Ok(self.devices[idx].tick(&mut self.clock, &mut self.rawlog))
    }

    pub fn current_state(&self, profile: u8) -> Result<DeviceState, GnssError> {
        Ok(self.device(profile)?.state())
    }

    pub fn previous_state(&self, profile: u8) -> Result<DeviceState, GnssError> {
        Ok(self.device(profile)?.previous_state())
    }

    /// Inject decryption keys; retained for replay across restarts.
    pub fn send_decryption_keys(&mut self, profile: u8, bytes: &[u8]) -> Result<(), GnssError> {
        self.device_mut(profile)?.send_decryption_keys(bytes)
    }

    /// Forward correction data to the receiver.
    pub fn send_correction_data(&mut self, profile: u8, bytes: &[u8]) -> Result<(), GnssError> {
        self.device_mut(profile)?.send_correction_data(bytes)
    }

    /// Send a pre-framed command straight through.
    pub fn send_formatted_command(&mut self, profile: u8, bytes: &[u8]) -> Result<(), GnssError> {
        self.device_mut(profile)?.send_formatted_command(bytes)
    }

    /// Latest decoded fix
    pub fn location(&self, profile: u8) -> Result<Location, GnssError> {
        Ok(*self.device(profile)?.location())
    }

    /// Whether a fix arrived since the last consume
    pub fn has_new_location(&self, profile: u8) -> Result<bool, GnssError> {
        Ok(self.device(profile)?.has_new_location())
    }

    /// Take the latest fix, clearing the new-location flag
    pub fn consume_location(&mut self, profile: u8) -> Result<Location, GnssError> {
        Ok(self.device_mut(profile)?.consume_location())
    }

    /// Maps URL for the current fix, when one is available
    pub fn gmaps_location(&self, profile: u8) -> Result<Option<heapless::String<64>>, GnssError> {
        Ok(self.device(profile)?.gmaps_location())
    }

    /// Turn dead reckoning on; honored only while the device is ready.
    pub fn enable_dead_reckoning(&mut self, profile: u8) -> Result<(), GnssError> {
        self.device_mut(profile)?.enable_dead_reckoning()
    }

    /// Turn dead reckoning off; honored only while the device is ready.
    pub fn disable_dead_reckoning(&mut self, profile: u8) -> Result<(), GnssError> {
        self.device_mut(profile)?.disable_dead_reckoning()
    }

    pub fn is_dr_enabled(&self, profile: u8) -> Result<bool, GnssError> {
        Ok(self.device(profile)?.is_dr_enabled())
    }

    pub fn is_dr_calibrated(&self, profile: u8) -> Result<bool, GnssError> {
        Ok(self.device(profile)?.is_dr_calibrated())
    }

    pub fn alignment_info(&self, profile: u8) -> Result<Option<AlignmentData>, GnssError> {
        Ok(self.device(profile)?.alignment_info())
    }

    pub fn fusion_status(&self, profile: u8) -> Result<Option<&FusionStatus>, GnssError> {
        Ok(self.device(profile)?.fusion_status())
    }

    pub fn vehicle_dynamics(&self, profile: u8) -> Result<Option<VehicleDynamics>, GnssError> {
        Ok(self.device(profile)?.vehicle_dynamics())
    }

    /// Erase the persisted calibration group for a profile
    pub fn delete_calibrations(&mut self, profile: u8) -> Result<(), GnssError> {
        self.device_mut(profile)?.delete_calibrations()
    }

    /// Feed one complete binary frame into a profile's dispatcher.
    pub fn on_binary_frame(&mut self, profile: u8, frame: &[u8]) -> Result<(), GnssError> {
        let now = self.clock.now_us();
        let idx = profile as usize;
        if idx >= self.devices.len() {
            return Err(GnssError::InvalidProfile);
        }
        self.devices[idx].on_binary_frame(now, frame, &mut self.rawlog);
        Ok(())
    }

    /// Feed one text sentence into a profile's dispatcher.
    pub fn on_text_sentence(&mut self, profile: u8, sentence: &[u8]) -> Result<(), GnssError> {
        let now = self.clock.now_us();
        let idx = profile as usize;
        if idx >= self.devices.len() {
            return Err(GnssError::InvalidProfile);
        }
        self.devices[idx].on_text_sentence(now, sentence, &mut self.rawlog);
        Ok(())
    }

    /// Move buffered raw traffic into `out`; returns bytes written.
    pub fn drain_raw_log(&mut self, out: &mut [u8]) -> usize {
        self.rawlog.drain_into(out)
    }

    /// Bytes lost to raw-log eviction since activation
    pub fn raw_log_overflow(&self) -> u32 {
        self.rawlog.overflow_count()
    }

    /// Drain all buffered raw traffic into a log sink.
    ///
    /// Returns the number of bytes flushed. A sink failure leaves the
    /// remaining bytes in the ring for the next pass.
    pub fn flush_raw_log<L: LogSink>(&mut self, sink: &mut L) -> Result<usize, GnssError> {
        let mut chunk = [0u8; 64];
        let mut total = 0;
        loop {
            let n = self.rawlog.drain_into(&mut chunk);
            if n == 0 {
                break;
            }
            sink.append(&chunk[..n])?;
            total += n;
        }
        if total > 0 {
            sink.flush()?;
        }
        Ok(total)
    }

    /// Clock access for host-side scenarios
    #[cfg(any(test, feature = "mock"))]
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockClock;
    use crate::platform::mock::{MockStore, MockTransport};

    fn registry() -> GnssRegistry<MockTransport, MockStore, MockClock> {
        GnssRegistry::new(MockClock::new())
    }

    #[test]
    fn test_profile_ids_sequential() {
        let mut reg = registry();
        assert_eq!(
            reg.add_profile(MockTransport::new(), MockStore::new()),
            Ok(0)
        );
        assert_eq!(
            reg.add_profile(MockTransport::new(), MockStore::new()),
            Ok(1)
        );
        assert_eq!(reg.profile_count(), 2);
    }

    #[test]
    fn test_registry_capacity_bounded() {
        let mut reg = registry();
        for _ in 0..MAX_DEVICES {
            reg.add_profile(MockTransport::new(), MockStore::new())
                .unwrap();
        }
        assert_eq!(
            reg.add_profile(MockTransport::new(), MockStore::new()),
            Err(GnssError::RegistryFull)
        );
    }

    #[test]
    fn test_unknown_profile_rejected_everywhere() {
        let mut reg = registry();
        reg.add_profile(MockTransport::new(), MockStore::new())
            .unwrap();

        assert_eq!(reg.tick(1), Err(GnssError::InvalidProfile));
        assert_eq!(reg.current_state(1), Err(GnssError::InvalidProfile));
        assert_eq!(
            reg.start_device(1, GnssConfig::default()),
            Err(GnssError::InvalidProfile)
        );
        assert_eq!(reg.stop_device(1), Err(GnssError::InvalidProfile));
        assert_eq!(reg.location(1), Err(GnssError::InvalidProfile));
        assert_eq!(
            reg.on_binary_frame(1, &[0xB5, 0x62]),
            Err(GnssError::InvalidProfile)
        );
        assert_eq!(
            reg.send_correction_data(1, &[0xD3]),
            Err(GnssError::InvalidProfile)
        );
    }

    #[test]
    fn test_tick_unconfigured_is_idle() {
        let mut reg = registry();
        let p = reg
            .add_profile(MockTransport::new(), MockStore::new())
            .unwrap();

        assert_eq!(reg.tick(p), Ok(TickStatus::Ok));
        assert_eq!(reg.current_state(p), Ok(DeviceState::Unconfigured));
    }
}
