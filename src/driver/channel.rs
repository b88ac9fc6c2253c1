use bit_field::BitField;

use super::Adc;
use crate::analog::TriggerSource;
use crate::error::{Error, Wait};
use crate::notifier::CompletionHandler;
use crate::profile::HardwareProfile;
use crate::registers::{Register, RegisterFile, adcsra, adcsrb};

impl<R: RegisterFile, P: HardwareProfile> Adc<'_, R, P> {
    /// Select the channel for the next conversions and register a handler.
    ///
    /// If the channel differs from the selected one, auto triggering is disabled
    /// and the driver waits for a conversion in progress to finish before the
    /// multiplexer is switched. Re-enable auto triggering with
    /// [`Adc::set_auto_trigger`] afterwards if needed.
    ///
    /// The handler always replaces the previously registered one. With `Some`
    /// handler the completion interrupt is enabled; with `None` it is disabled.
    /// From then on the handler may be called from the interrupt at any time.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if the conversion in progress does not finish. The
    /// channel and handler are left unchanged in that case, but auto triggering has
    /// already been disabled.
    pub fn configure(
        &mut self,
        channel: P::Channel,
        handler: Option<CompletionHandler>,
    ) -> Result<(), Error> {
        if channel != self.state.channel {
            self.select_channel(channel)?;
        }
        self.register_handler(handler);
        Ok(())
    }

    /// Enable or disable auto triggering.
    ///
    /// When enabling, the trigger source is written before auto triggering is
    /// turned on, so the previous source cannot fire a conversion in between. When
    /// disabling, `source` is ignored and the stored source is left in place.
    ///
    /// Changing the channel with [`Adc::configure`] disables auto triggering.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedTrigger`] if the part has no such trigger source.
    pub fn set_auto_trigger(&mut self, enable: bool, source: TriggerSource) -> Result<(), Error> {
        if !enable {
            self.stop();
            return Ok(());
        }
        if !P::supports_trigger(source) {
            return Err(Error::UnsupportedTrigger(source));
        }

        self.registers.modify(Register::Adcsrb, |v| {
            v.set_bits(adcsrb::ADTS, source.into());
        });
        self.registers.modify(Register::Adcsra, |v| {
            v.set_bit(adcsra::ADATE, true);
        });
        self.state.auto_trigger = true;
        self.state.trigger_source = source;
        trace!("auto trigger on: {:?}", source);
        Ok(())
    }

    /// Switch the multiplexer once the ADC is idle.
    pub(crate) fn select_channel(&mut self, channel: P::Channel) -> Result<(), Error> {
        self.stop();
        self.wait_while_converting(Wait::ConversionIdle)?;
        P::apply_channel(&self.registers, channel);
        self.state.channel = channel;
        trace!("channel -> {:?}", channel);
        Ok(())
    }

    /// Store the handler and make the interrupt enable bit agree with it.
    ///
    /// The interrupt is disabled before a handler is removed and enabled only
    /// after one is stored, so the interrupt never finds the slot out of step.
    pub(crate) fn register_handler(&mut self, handler: Option<CompletionHandler>) {
        match handler {
            Some(_) => {
                self.notifier.register(handler);
                self.set_interrupt_enabled(true);
            }
            None => {
                self.set_interrupt_enabled(false);
                self.notifier.register(None);
            }
        }
    }
}
