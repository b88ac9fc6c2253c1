use embedded_hal::delay::DelayNs;

use super::{Adc, DriverState};
use crate::analog::{Prescaler, VoltageReference};
use crate::error::{Error, Wait};
use crate::notifier::CompletionHandler;
use crate::profile::HardwareProfile;
use crate::registers::RegisterFile;

/// Highest result of a 10-bit conversion.
pub const FULL_SCALE: u32 = 1023;

/// Configuration saved for the duration of a supply voltage measurement.
#[derive(Debug, Clone, Copy)]
struct StoredConfig<C> {
    state: DriverState<C>,
    handler: Option<CompletionHandler>,
}

/// Supply voltage in millivolts for a bandgap conversion made against AVCC.
///
/// The reading is `bandgap / vcc * 1023`, which is inverted here. Integer
/// division truncates, so the result is rounded down.
pub fn supply_millivolts(bandgap_millivolts: u32, raw: u16) -> Result<u32, Error> {
    if raw == 0 {
        return Err(Error::ZeroBandgapReading);
    }
    Ok(bandgap_millivolts * FULL_SCALE / u32::from(raw))
}

impl<R: RegisterFile, P: HardwareProfile> Adc<'_, R, P> {
    /// Measure the supply voltage (AVCC), in millivolts.
    ///
    /// The internal bandgap reference is converted with the supply as reference,
    /// and the supply voltage is derived from the assumed bandgap voltage (see
    /// [`AdcSettings::with_bandgap_millivolts`]). No external components are
    /// needed.
    ///
    /// This blocks for the settle delay (10ms by default) plus one conversion.
    /// During that time the completion interrupt is disabled and the handler is
    /// not called. Afterwards the reference, prescaler, channel, auto trigger
    /// setting and handler are exactly as they were, but a free running sequence
    /// stopped by the measurement has to be started again with [`Adc::start`].
    ///
    /// Configuration is restored even if the measurement fails. If the bandgap
    /// conversion never finishes, the ADC is briefly powered down to end it so that
    /// the channel can be switched back.
    ///
    /// # Errors
    ///
    /// - [`Error::InsideCompletionHandler`] if called from a completion handler.
    /// - [`Error::ConverterDisabled`] if the ADC is powered down.
    /// - [`Error::Timeout`] if a conversion does not finish.
    /// - [`Error::ZeroBandgapReading`] if the bandgap channel reads zero.
    ///
    /// [`AdcSettings::with_bandgap_millivolts`]: crate::AdcSettings::with_bandgap_millivolts
    pub fn measure_supply_voltage(&mut self, delay: &mut impl DelayNs) -> Result<u32, Error> {
        if self.notifier.is_dispatching() {
            return Err(Error::InsideCompletionHandler);
        }
        if !self.is_enabled() {
            return Err(Error::ConverterDisabled);
        }

        let saved = StoredConfig {
            state: self.state,
            handler: self.notifier.handler(),
        };

        let measured = self.convert_band_gap(delay);
        // Whatever happened, don't let the interrupt fire for the bandgap result.
        self.registers.clear_completion_flag();
        let restored = self.restore(saved);

        let millivolts = measured?;
        restored?;
        debug!("supply voltage: {} mV", millivolts);
        Ok(millivolts)
    }

    fn convert_band_gap(&mut self, delay: &mut impl DelayNs) -> Result<u32, Error> {
        self.stop();
        self.wait_while_converting(Wait::ConversionIdle)?;

        self.set_reference(VoltageReference::Avcc);
        self.set_prescaler(Prescaler::SLOWEST);
        self.select_channel(P::BAND_GAP)?;
        // Polled, not interrupt driven. The handler stays in the notifier.
        self.set_interrupt_enabled(false);

        self.registers.clear_completion_flag();
        delay.delay_ms(self.settings.settle_delay_ms());

        self.start()?;
        self.wait_while_converting(Wait::ConversionComplete)?;
        let raw = P::read_result(&self.registers);
        trace!("bandgap reading: {}", raw);

        supply_millivolts(self.settings.bandgap_millivolts(), raw)
    }

    /// Put the saved configuration back, as far as the hardware allows.
    ///
    /// Every step runs even if an earlier one fails, so the handler and the
    /// interrupt enable bit always end up agreeing. The first error is returned.
    fn restore(&mut self, saved: StoredConfig<P::Channel>) -> Result<(), Error> {
        let StoredConfig { state, handler } = saved;
        self.set_reference(state.reference);
        self.set_prescaler(state.prescaler);

        let switched = if state.channel == self.state.channel {
            Ok(())
        } else {
            match self.select_channel(state.channel) {
                Ok(()) => Ok(()),
                Err(error) => {
                    warn!("conversion stuck after bandgap reading, aborting it");
                    self.abort_conversion();
                    self.select_channel(state.channel).and(Err(error))
                }
            }
        };
        self.register_handler(handler);
        let retriggered = if state.auto_trigger {
            self.set_auto_trigger(true, state.trigger_source)
        } else {
            Ok(())
        };
        switched.and(retriggered)
    }

    /// End a conversion in progress by powering the ADC down and up again.
    fn abort_conversion(&mut self) {
        self.enable(false);
        self.enable(true);
    }
}
