//! Driver settings.

use crate::analog::{Prescaler, VoltageReference};

/// Bandgap voltage assumed when deriving the supply voltage, in millivolts.
///
/// The datasheet gives 1.1V nominal. Individual parts vary by up to about ±10%, so
/// calibrate against a known supply and use [`AdcSettings::with_bandgap_millivolts`]
/// when accuracy matters.
pub const BANDGAP_MILLIVOLTS: u32 = 1100;

/// Time for the bandgap reference to settle after switching the voltage reference.
pub const SETTLE_DELAY_MS: u32 = 10;

/// Default number of status register polls before a busy-wait gives up.
///
/// One conversion takes 13 ADC clock cycles (25 for the first after enabling).
/// At the slowest prescaler that is 3200 system clock cycles, so this leaves a wide
/// margin for any polling loop.
pub const DEFAULT_POLL_BUDGET: u32 = 100_000;

/// Settings applied when the driver is created.
///
/// This struct offers a builder-like interface. Start from [`AdcSettings::new`],
/// which uses the supply voltage as reference and the slowest ADC clock, and
/// change what you need.
///
/// ```rust
/// # use atmega_adc_hal::AdcSettings;
/// # use atmega_adc_hal::analog::{Prescaler, VoltageReference};
/// let mut settings = AdcSettings::new();
/// settings
///     .with_reference(VoltageReference::Internal)
///     .with_prescaler(Prescaler::Div64);
/// assert_eq!(settings.prescaler(), Prescaler::Div64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcSettings {
    /// Initial voltage reference.
    reference: VoltageReference,
    /// Initial ADC clock prescaler.
    prescaler: Prescaler,
    /// Status register polls before a busy-wait gives up.
    poll_budget: u32,
    /// Delay after switching to the bandgap channel, in milliseconds.
    settle_delay_ms: u32,
    /// Assumed bandgap voltage, in millivolts.
    bandgap_millivolts: u32,
}

impl Default for AdcSettings {
    fn default() -> Self {
        Self {
            reference: VoltageReference::Avcc,
            prescaler: Prescaler::SLOWEST,
            poll_budget: DEFAULT_POLL_BUDGET,
            settle_delay_ms: SETTLE_DELAY_MS,
            bandgap_millivolts: BANDGAP_MILLIVOLTS,
        }
    }
}

impl AdcSettings {
    /// Create the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the initial voltage reference.
    pub fn with_reference(&mut self, reference: VoltageReference) -> &mut Self {
        self.reference = reference;
        self
    }

    /// Change the initial ADC clock prescaler.
    pub fn with_prescaler(&mut self, prescaler: Prescaler) -> &mut Self {
        self.prescaler = prescaler;
        self
    }

    /// Change how many times the status register is polled before a busy-wait
    /// returns [`Error::Timeout`](crate::Error::Timeout).
    ///
    /// A budget of zero is raised to one, so that a single poll always happens.
    pub fn with_poll_budget(&mut self, polls: u32) -> &mut Self {
        self.poll_budget = polls.max(1);
        self
    }

    /// Change the delay between selecting the bandgap channel and starting the
    /// supply voltage conversion.
    pub fn with_settle_delay_ms(&mut self, ms: u32) -> &mut Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Change the bandgap voltage used to derive the supply voltage.
    pub fn with_bandgap_millivolts(&mut self, millivolts: u32) -> &mut Self {
        self.bandgap_millivolts = millivolts;
        self
    }

    /// Initial voltage reference.
    pub fn reference(&self) -> VoltageReference {
        self.reference
    }

    /// Initial ADC clock prescaler.
    pub fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// Status register polls before a busy-wait gives up.
    pub fn poll_budget(&self) -> u32 {
        self.poll_budget
    }

    /// Settle delay of the supply voltage measurement, in milliseconds.
    pub fn settle_delay_ms(&self) -> u32 {
        self.settle_delay_ms
    }

    /// Assumed bandgap voltage, in millivolts.
    pub fn bandgap_millivolts(&self) -> u32 {
        self.bandgap_millivolts
    }
}
