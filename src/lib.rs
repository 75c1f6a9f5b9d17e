#![cfg_attr(not(test), no_std)]

//! navrx - orchestration core for u-blox GNSS/dead-reckoning receivers
//!
//! This library drives the full lifecycle of a positioning receiver: bring-up,
//! configuration, correction-data and decryption-key injection, dead-reckoning
//! calibration, steady-state message harvesting, and watchdog-driven recovery.
//!
//! The hardware-facing side (bus transport, persistent key-value store, raw
//! log sink) is consumed through narrow traits in [`platform`], so the whole
//! crate is host-testable against the mock implementations.

// Mocks record transactions with growable buffers, host only
#[cfg(any(test, feature = "mock"))]
extern crate std;

// Platform abstraction layer: error types, traits, mocks
pub mod platform;

// Cross-cutting services: logging macros, time source, shared-state wrappers
pub mod core;

// Receiver orchestration: codec, dispatcher, calibration, lifecycle FSM
pub mod gnss;
