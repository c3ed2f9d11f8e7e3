//! The abstracted components for the lipo-monitor binary.

#![no_std]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

pub mod adc;
pub mod calibration;
pub mod cells;
pub mod charge;
pub mod diag;
pub mod monitor;
#[cfg(target_arch = "arm")]
pub mod samd_adc;
pub mod status;
pub mod target;
#[cfg(feature = "usbserial")]
pub mod usbserial;

#[cfg(test)]
mod fake;
