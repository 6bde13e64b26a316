//! Board-agnostic core of the SunGuard UV exposure wearable
//!
//! This crate contains all logic that does not touch microcontroller
//! registers:
//!
//! - Collaborator traits (sensor, buzzer, buttons, storage, power, clock)
//! - Exposure model (minutes-to-burn budget)
//! - Interrupt-shared tick counter
//! - Per-button press tracking
//! - Persisted settings layout
//! - Audio feedback sequences
//! - Device state machine and the controller that drives it
//!
//! The firmware crate supplies the board implementations of [`traits`];
//! the host test-suite supplies simulated ones.

#![no_std]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

pub mod button;
pub mod config;
pub mod device;
pub mod error;
pub mod exposure;
pub mod feedback;
pub mod settings;
pub mod state;
pub mod tick;
pub mod traits;

#[cfg(test)]
mod mock;

pub use device::Device;
pub use error::Error;
pub use state::{DeviceState, Event};
