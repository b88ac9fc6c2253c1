use bit_field::BitField;

use crate::analog::{Prescaler, TriggerSource, VoltageReference};
use crate::error::{Error, Wait};
use crate::notifier::{CompletionHandler, CompletionNotifier};
use crate::profile::HardwareProfile;
use crate::registers::{Register, RegisterFile, adcsra, adcsrb, admux};
use crate::settings::AdcSettings;

mod channel;
mod supply;

pub use supply::{FULL_SCALE, supply_millivolts};

/// Whether the ADC is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionState {
    /// No conversion in progress.
    Idle,
    /// A conversion is in progress. In free running mode the ADC stays here until
    /// [`Adc::stop`] takes effect at the end of the current conversion.
    Converting,
}

/// Driver-side copy of the ADC configuration.
///
/// Only the driver changes the ADC registers, so this always matches the
/// hardware. The handler is kept in the [`CompletionNotifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DriverState<C> {
    pub(crate) reference: VoltageReference,
    pub(crate) prescaler: Prescaler,
    pub(crate) channel: C,
    pub(crate) auto_trigger: bool,
    pub(crate) trigger_source: TriggerSource,
}

/// Driver for the ADC of an ATmega328P or ATmega32U4.
///
/// # Quick start
///
/// Create a [`CompletionNotifier`] (normally a `static` shared with the ADC
/// interrupt vector) and pass it with a register file to [`Adc::new`]. Then select
/// a channel and a handler with [`Adc::configure`], and call [`Adc::start`]. The
/// handler receives the result from the interrupt once the conversion is done.
///
/// For continuous sampling, enable auto triggering with
/// [`TriggerSource::FreeRunning`] before starting; [`Adc::stop`] ends it.
///
/// [`Adc::measure_supply_voltage`] estimates the supply voltage from the internal
/// bandgap reference, without any external components.
///
/// # Overview
///
/// Every setter compares the requested configuration with what is in the
/// registers and only writes on a change. Writing the same configuration again is
/// free, and does not disturb a conversion in progress.
///
/// The driver does no locking. `&mut self` receivers keep callers on the same
/// handle apart, but nothing else may touch the ADC registers while the driver
/// owns them, apart from the completion interrupt calling the notifier.
#[derive(Debug)]
pub struct Adc<'n, R, P: HardwareProfile> {
    registers: R,
    notifier: &'n CompletionNotifier<P>,
    state: DriverState<P::Channel>,
    settings: AdcSettings,
}

impl<'n, R: RegisterFile, P: HardwareProfile> Adc<'n, R, P> {
    ////////////////////////////////////////////////////////////////////////////////
    // Constructor
    ////////////////////////////////////////////////////////////////////////////////

    /// Take over the ADC and bring it into a known state.
    ///
    /// The ADC is powered up with the reference and prescaler from `settings`,
    /// auto triggering and the completion interrupt are turned off, results are
    /// right-adjusted, and [`HardwareProfile::DEFAULT_CHANNEL`] is selected. Any
    /// handler left in the notifier is dropped.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if a conversion started before the driver took over does
    /// not finish.
    pub fn new(
        registers: R,
        notifier: &'n CompletionNotifier<P>,
        settings: &AdcSettings,
    ) -> Result<Self, Error> {
        let adc = Self {
            registers,
            notifier,
            state: DriverState {
                reference: settings.reference(),
                prescaler: settings.prescaler(),
                channel: P::DEFAULT_CHANNEL,
                auto_trigger: false,
                trigger_source: TriggerSource::FreeRunning,
            },
            settings: *settings,
        };

        adc.registers.modify(Register::Adcsra, |v| {
            v.set_bit(adcsra::ADIE, false);
            v.set_bit(adcsra::ADATE, false);
        });
        adc.notifier.register(None);
        adc.wait_while_converting(Wait::ConversionIdle)?;

        adc.registers.modify(Register::Admux, |v| {
            v.set_bit(admux::ADLAR, false);
        });
        adc.registers.modify(Register::Adcsrb, |v| {
            v.set_bits(adcsrb::ADTS, TriggerSource::FreeRunning.into());
        });
        P::apply_channel(&adc.registers, P::DEFAULT_CHANNEL);
        adc.write_reference(settings.reference());
        adc.write_prescaler(settings.prescaler());
        adc.registers.modify(Register::Adcsra, |v| {
            v.set_bit(adcsra::ADEN, true);
        });

        debug!(
            "ADC ready: reference {:?}, prescaler {:?}",
            settings.reference(),
            settings.prescaler()
        );
        Ok(adc)
    }

    /// Give back the register file.
    ///
    /// The ADC is left as it is, and the handler stays registered.
    pub fn free(self) -> R {
        self.registers
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Configuration
    ////////////////////////////////////////////////////////////////////////////////

    /// Set the voltage reference and ADC clock prescaler, and power up the ADC.
    ///
    /// Each setting is only written if it differs from the current one.
    ///
    /// <div class="warning">
    ///
    /// The first conversion after changing the reference may be inaccurate while
    /// the new reference settles, particularly when switching to the internal
    /// reference.
    ///
    /// </div>
    pub fn init(&mut self, reference: VoltageReference, prescaler: Prescaler) {
        self.set_reference(reference);
        self.set_prescaler(prescaler);
        self.enable(true);
    }

    pub(crate) fn set_reference(&mut self, reference: VoltageReference) {
        self.write_reference(reference);
        self.state.reference = reference;
    }

    pub(crate) fn set_prescaler(&mut self, prescaler: Prescaler) {
        self.write_prescaler(prescaler);
        self.state.prescaler = prescaler;
    }

    fn write_reference(&self, reference: VoltageReference) {
        let bits = u8::from(reference);
        if self.registers.read(Register::Admux).get_bits(admux::REFS) != bits {
            trace!("reference -> {:?}", reference);
            self.registers.modify(Register::Admux, |v| {
                v.set_bits(admux::REFS, bits);
            });
        }
    }

    fn write_prescaler(&self, prescaler: Prescaler) {
        let bits = u8::from(prescaler);
        if self.registers.read(Register::Adcsra).get_bits(adcsra::ADPS) != bits {
            trace!("prescaler -> {:?}", prescaler);
            self.registers.modify(Register::Adcsra, |v| {
                v.set_bits(adcsra::ADPS, bits);
            });
        }
    }

    /// Power the ADC up or down.
    ///
    /// This is separate from the conversion state: powering down keeps the
    /// selected channel, handler, reference and prescaler, and [`Adc::start`]
    /// refuses to run until the ADC is powered up again.
    ///
    /// Powering down saves current during sleep. In idle sleep mode a powered ADC
    /// starts a noise-reduced conversion.
    pub fn enable(&mut self, on: bool) {
        self.registers.modify(Register::Adcsra, |v| {
            v.set_bit(adcsra::ADEN, on);
        });
    }

    /// Whether the ADC is powered up.
    pub fn is_enabled(&self) -> bool {
        self.registers.read(Register::Adcsra).get_bit(adcsra::ADEN)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Conversions
    ////////////////////////////////////////////////////////////////////////////////

    /// Start a conversion on the selected channel.
    ///
    /// Without auto triggering, one conversion is done and the handler is called
    /// once. With auto triggering and [`TriggerSource::FreeRunning`], the ADC keeps
    /// converting and the handler is called after every conversion until
    /// [`Adc::stop`]. With another trigger source this starts the first
    /// conversion, and the trigger events start the rest.
    ///
    /// # Errors
    ///
    /// [`Error::ConverterDisabled`] if the ADC is powered down. Nothing is written
    /// in that case.
    pub fn start(&mut self) -> Result<(), Error> {
        if !self.is_enabled() {
            warn!("ADC start requested while powered down");
            return Err(Error::ConverterDisabled);
        }
        self.registers.modify(Register::Adcsra, |v| {
            v.set_bit(adcsra::ADSC, true);
        });
        Ok(())
    }

    /// Disable auto triggering.
    ///
    /// A conversion already in progress is not aborted: it finishes and its
    /// result is delivered as usual. The trigger source is kept for the next time
    /// auto triggering is enabled.
    pub fn stop(&mut self) {
        self.registers.modify(Register::Adcsra, |v| {
            v.set_bit(adcsra::ADATE, false);
        });
        self.state.auto_trigger = false;
    }

    /// Whether a conversion is in progress.
    pub fn conversion_state(&self) -> ConversionState {
        if self.registers.is_converting() {
            ConversionState::Converting
        } else {
            ConversionState::Idle
        }
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Inspection
    ////////////////////////////////////////////////////////////////////////////////

    /// Selected voltage reference.
    pub fn reference(&self) -> VoltageReference {
        self.state.reference
    }

    /// Selected ADC clock prescaler.
    pub fn prescaler(&self) -> Prescaler {
        self.state.prescaler
    }

    /// Selected input channel.
    pub fn channel(&self) -> P::Channel {
        self.state.channel
    }

    /// Trigger source if auto triggering is enabled.
    pub fn auto_trigger(&self) -> Option<TriggerSource> {
        self.state.auto_trigger.then_some(self.state.trigger_source)
    }

    /// Registered completion handler.
    pub fn handler(&self) -> Option<CompletionHandler> {
        self.notifier.handler()
    }

    /// Settings the driver was created with.
    pub fn settings(&self) -> &AdcSettings {
        &self.settings
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Internals
    ////////////////////////////////////////////////////////////////////////////////

    /// Poll until ADSC reads zero, at most `poll_budget` times.
    pub(crate) fn wait_while_converting(&self, waiting_for: Wait) -> Result<(), Error> {
        for _ in 0..self.settings.poll_budget() {
            if !self.registers.is_converting() {
                return Ok(());
            }
        }
        warn!("ADC busy-wait gave up: {:?}", waiting_for);
        Err(Error::Timeout(waiting_for))
    }

    fn set_interrupt_enabled(&self, on: bool) {
        self.registers.modify(Register::Adcsra, |v| {
            v.set_bit(adcsra::ADIE, on);
        });
    }
}
