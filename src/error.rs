use core::fmt;

use crate::analog::TriggerSource;

/// Condition a bounded busy-wait was polling for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wait {
    /// No conversion in progress, before changing the channel.
    ConversionIdle,
    /// The polled conversion of a supply voltage measurement to finish.
    ConversionComplete,
}

/// Problems when driving the ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The ADC still reported a conversion in progress after the poll budget was
    /// used up.
    ///
    /// This points at misbehaving hardware, or a poll budget that is too small for
    /// the chosen prescaler. See [`AdcSettings::with_poll_budget`].
    ///
    /// [`AdcSettings::with_poll_budget`]: crate::AdcSettings::with_poll_budget
    Timeout(Wait),
    /// The ADC is powered down (ADEN clear), so no conversion would take place.
    ///
    /// Power it up with [`Adc::enable`](crate::Adc::enable).
    ConverterDisabled,
    /// The bandgap channel read as zero, so no supply voltage can be derived.
    ZeroBandgapReading,
    /// The trigger source is not available on this part.
    UnsupportedTrigger(TriggerSource),
    /// A supply voltage measurement was requested from within a completion
    /// handler.
    ///
    /// The measurement waits for a conversion that cannot be serviced while the
    /// completion interrupt is being handled.
    InsideCompletionHandler,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(Wait::ConversionIdle) => {
                write!(f, "timed out waiting for the conversion in progress")
            }
            Self::Timeout(Wait::ConversionComplete) => {
                write!(f, "timed out waiting for the bandgap conversion")
            }
            Self::ConverterDisabled => write!(f, "ADC is disabled"),
            Self::ZeroBandgapReading => write!(f, "bandgap reading was zero"),
            Self::UnsupportedTrigger(source) => {
                write!(f, "trigger source {source:?} not supported")
            }
            Self::InsideCompletionHandler => {
                write!(f, "supply measurement requested from completion handler")
            }
        }
    }
}

impl core::error::Error for Error {}
