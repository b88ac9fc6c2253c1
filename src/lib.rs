#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod analog;
mod driver;
mod error;
#[cfg(target_arch = "avr")]
pub mod mmio;
mod notifier;
pub mod profile;
pub mod registers;
mod settings;

pub use driver::{Adc, ConversionState, FULL_SCALE, supply_millivolts};
pub use error::{Error, Wait};
pub use notifier::{CompletionHandler, CompletionNotifier};
pub use settings::{AdcSettings, BANDGAP_MILLIVOLTS, DEFAULT_POLL_BUDGET, SETTLE_DELAY_MS};
