//! Reference, clock and trigger settings of the ADC.
//!
//! Each type converts into the bit pattern of its register field with `u8::from`.

/// Raw result of one conversion.
///
/// The ADC is 10 bits wide and results are right-adjusted, so the value is in
/// `0..=1023`.
pub type ConversionResult = u16;

/// Voltage the input is compared against.
///
/// # Datasheet
///
/// See the REFS\[1:0\] bits in the ADMUX register description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageReference {
    /// External voltage applied to the AREF pin.
    ///
    /// On Arduino Nano boards the AREF pin sits between "3V3" and "A0".
    Aref,
    /// The supply voltage (AVCC).
    ///
    /// AREF should be decoupled with an external capacitor.
    Avcc,
    /// The fixed internal reference.
    ///
    /// 1.1V on the ATmega328P and 2.56V on the ATmega32U4. AREF should be decoupled
    /// with an external capacitor.
    Internal,
}

#[doc(hidden)]
impl From<VoltageReference> for u8 {
    fn from(value: VoltageReference) -> Self {
        match value {
            VoltageReference::Aref => 0b00,
            VoltageReference::Avcc => 0b01,
            VoltageReference::Internal => 0b11,
        }
    }
}

/// Division factor between the system clock and the ADC clock.
///
/// Full 10-bit resolution needs an ADC clock between 50kHz and 200kHz, so with a
/// 16MHz system clock only [`Prescaler::Div128`] is in range. Smaller divisors
/// convert faster at reduced accuracy.
///
/// # Datasheet
///
/// See the ADPS\[2:0\] bits in the ADCSRA register description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    /// System clock / 2.
    Div2,
    /// System clock / 4.
    Div4,
    /// System clock / 8.
    Div8,
    /// System clock / 16.
    Div16,
    /// System clock / 32.
    Div32,
    /// System clock / 64.
    Div64,
    /// System clock / 128.
    Div128,
}

impl Prescaler {
    /// The slowest (most accurate) ADC clock available.
    pub const SLOWEST: Self = Self::Div128;
}

#[doc(hidden)]
impl From<Prescaler> for u8 {
    fn from(value: Prescaler) -> Self {
        match value {
            Prescaler::Div2 => 0b001,
            Prescaler::Div4 => 0b010,
            Prescaler::Div8 => 0b011,
            Prescaler::Div16 => 0b100,
            Prescaler::Div32 => 0b101,
            Prescaler::Div64 => 0b110,
            Prescaler::Div128 => 0b111,
        }
    }
}

/// Event that starts a conversion while auto triggering is enabled.
///
/// With [`TriggerSource::FreeRunning`] a conversion is started by
/// [`Adc::start`](crate::Adc::start); with auto triggering enabled the ADC then
/// keeps converting back to back. Without auto triggering only one conversion is
/// done.
///
/// The Timer4 sources exist only on the ATmega32U4. See
/// [`HardwareProfile::supports_trigger`](crate::profile::HardwareProfile::supports_trigger).
///
/// # Datasheet
///
/// See the ADTS\[3:0\] bits in the ADCSRB register description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSource {
    /// Free running mode.
    FreeRunning,
    /// Analog comparator.
    AnalogComparator,
    /// External interrupt request 0.
    ExternalInt0,
    /// Timer/Counter0 compare match A.
    Timer0CompareA,
    /// Timer/Counter0 overflow.
    Timer0Overflow,
    /// Timer/Counter1 compare match B.
    Timer1CompareB,
    /// Timer/Counter1 overflow.
    Timer1Overflow,
    /// Timer/Counter1 capture event.
    Timer1Capture,
    /// Timer/Counter4 overflow.
    Timer4Overflow,
    /// Timer/Counter4 compare match A.
    Timer4CompareA,
    /// Timer/Counter4 compare match B.
    Timer4CompareB,
    /// Timer/Counter4 compare match D.
    Timer4CompareD,
}

#[doc(hidden)]
impl From<TriggerSource> for u8 {
    fn from(value: TriggerSource) -> Self {
        match value {
            TriggerSource::FreeRunning => 0b0000,
            TriggerSource::AnalogComparator => 0b0001,
            TriggerSource::ExternalInt0 => 0b0010,
            TriggerSource::Timer0CompareA => 0b0011,
            TriggerSource::Timer0Overflow => 0b0100,
            TriggerSource::Timer1CompareB => 0b0101,
            TriggerSource::Timer1Overflow => 0b0110,
            TriggerSource::Timer1Capture => 0b0111,
            TriggerSource::Timer4Overflow => 0b1000,
            TriggerSource::Timer4CompareA => 0b1001,
            TriggerSource::Timer4CompareB => 0b1010,
            TriggerSource::Timer4CompareD => 0b1011,
        }
    }
}
