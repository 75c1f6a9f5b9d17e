//! Receiver transport trait
//!
//! Abstracts the bus carrying receiver traffic (I2C on the reference board).
//! The transport delivers complete frames: the board layer owns byte-level
//! framing and invokes the dispatcher with one UBX frame or NMEA sentence at
//! a time. Power sequencing happens before `open` and is not modeled here.

use crate::platform::Result;

/// Receive channel selector.
///
/// The receiver emits two independent streams: binary UBX frames and NMEA
/// text sentences. Each is started and stopped as its own session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelKind {
    /// UBX binary frames
    Binary,
    /// NMEA text sentences
    Text,
}

/// Opaque handle identifying a running receive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionHandle(pub u32);

/// Transport configuration hints for the board layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportConfig {
    /// Bus address of the receiver
    pub address: u8,
    /// Bus frequency in Hz
    pub frequency: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        // u-blox default I2C address, fast mode
        Self {
            address: 0x42,
            frequency: 400_000,
        }
    }
}

/// Transport interface for receiver communication
pub trait TransportInterface {
    /// Open the device on the bus.
    ///
    /// A single open attempt; the lifecycle FSM owns the bounded retry loop.
    fn open(&mut self, config: &TransportConfig) -> Result<()>;

    /// Close the device. Closing a device that is not open is a no-op success.
    fn close(&mut self) -> Result<()>;

    /// Whether the device is currently open
    fn is_open(&self) -> bool;

    /// Send one complete, already-framed command to the receiver
    fn send_frame(&mut self, data: &[u8]) -> Result<()>;

    /// Start a receive session for one channel.
    ///
    /// Frames arriving on the channel are handed to the dispatcher by the
    /// board layer for as long as the session is running.
    fn start_receive(&mut self, channel: ChannelKind) -> Result<SessionHandle>;

    /// Stop a running receive session.
    ///
    /// Synchronous: returns after the underlying session teardown completes.
    fn stop_receive(&mut self, handle: SessionHandle) -> Result<()>;
}
