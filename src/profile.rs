//! Per-part differences between supported microcontrollers.
//!
//! The ATmega328P and ATmega32U4 share the ADC register layout, but differ in the
//! set of input channels, in how wide the channel selection is, and in the
//! available auto trigger sources. A [`HardwareProfile`] captures these
//! differences, and the driver is generic over it.

use core::fmt::Debug;

use bit_field::BitField;

use crate::analog::{ConversionResult, TriggerSource};
use crate::registers::{Register, RegisterFile, adcsrb};

/// Channel selection and result access for one part.
pub trait HardwareProfile {
    /// Analog inputs available on this part.
    #[cfg(not(feature = "defmt"))]
    type Channel: Copy + PartialEq + Debug;
    /// Analog inputs available on this part.
    #[cfg(feature = "defmt")]
    type Channel: Copy + PartialEq + Debug + defmt::Format;

    /// The internal bandgap reference (about 1.1V), used to measure the supply.
    const BAND_GAP: Self::Channel;

    /// Ground, useful to check the offset of the ADC.
    const GROUND: Self::Channel;

    /// Channel selected after reset.
    const DEFAULT_CHANNEL: Self::Channel;

    /// Every selectable channel, in multiplexer order.
    fn channels() -> &'static [Self::Channel];

    /// Write the multiplexer bits for `channel`.
    ///
    /// Only the multiplexer bits are changed, and registers whose bits already
    /// match are not written.
    fn apply_channel<R: RegisterFile>(registers: &R, channel: Self::Channel);

    /// Whether `source` can auto trigger a conversion on this part.
    fn supports_trigger(source: TriggerSource) -> bool;

    /// Read the latched result of the last conversion.
    ///
    /// ADCL must be read before ADCH. Reading ADCL locks both result registers
    /// until ADCH is read, so a conversion finishing in between cannot tear the
    /// value.
    fn read_result<R: RegisterFile>(registers: &R) -> ConversionResult {
        let low = registers.read(Register::Adcl);
        let high = registers.read(Register::Adch);
        u16::from_le_bytes([low, high])
    }
}

/// The ATmega328P (Arduino Uno and Nano).
#[derive(Debug, Clone, Copy)]
pub struct Atmega328p;

/// Analog inputs of the ATmega328P.
///
/// ADC6 and ADC7 are only bonded out on the TQFP and QFN packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Atmega328pChannel {
    Adc0,
    Adc1,
    Adc2,
    Adc3,
    Adc4,
    Adc5,
    Adc6,
    Adc7,
    /// On-die temperature sensor. Requires the internal 1.1V reference.
    Temperature,
    /// Internal 1.1V bandgap reference.
    BandGap,
    /// 0V (GND).
    Gnd,
}

#[doc(hidden)]
impl From<Atmega328pChannel> for u8 {
    fn from(value: Atmega328pChannel) -> Self {
        match value {
            Atmega328pChannel::Adc0 => 0b0000,
            Atmega328pChannel::Adc1 => 0b0001,
            Atmega328pChannel::Adc2 => 0b0010,
            Atmega328pChannel::Adc3 => 0b0011,
            Atmega328pChannel::Adc4 => 0b0100,
            Atmega328pChannel::Adc5 => 0b0101,
            Atmega328pChannel::Adc6 => 0b0110,
            Atmega328pChannel::Adc7 => 0b0111,
            Atmega328pChannel::Temperature => 0b1000,
            Atmega328pChannel::BandGap => 0b1110,
            Atmega328pChannel::Gnd => 0b1111,
        }
    }
}

impl HardwareProfile for Atmega328p {
    type Channel = Atmega328pChannel;

    const BAND_GAP: Atmega328pChannel = Atmega328pChannel::BandGap;
    const GROUND: Atmega328pChannel = Atmega328pChannel::Gnd;
    const DEFAULT_CHANNEL: Atmega328pChannel = Atmega328pChannel::Adc0;

    fn channels() -> &'static [Atmega328pChannel] {
        use Atmega328pChannel::*;
        &[
            Adc0,
            Adc1,
            Adc2,
            Adc3,
            Adc4,
            Adc5,
            Adc6,
            Adc7,
            Temperature,
            BandGap,
            Gnd,
        ]
    }

    fn apply_channel<R: RegisterFile>(registers: &R, channel: Atmega328pChannel) {
        // MUX[3:0]; bit 4 is reserved on this part.
        registers.modify(Register::Admux, |admux| {
            admux.set_bits(0..4, u8::from(channel));
        });
    }

    fn supports_trigger(source: TriggerSource) -> bool {
        u8::from(source) <= u8::from(TriggerSource::Timer1Capture)
    }
}

/// The ATmega32U4 (Arduino Leonardo and Micro).
#[derive(Debug, Clone, Copy)]
pub struct Atmega32u4;

/// Single-ended analog inputs of the ATmega32U4.
///
/// ADC2 and ADC3 do not exist on this part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Atmega32u4Channel {
    Adc0,
    Adc1,
    Adc4,
    Adc5,
    Adc6,
    Adc7,
    /// Internal 1.1V bandgap reference.
    BandGap,
    /// 0V (GND).
    Gnd,
    Adc8,
    Adc9,
    Adc10,
    Adc11,
    Adc12,
    Adc13,
    /// On-die temperature sensor. Requires the internal 2.56V reference.
    Temperature,
}

#[doc(hidden)]
impl From<Atmega32u4Channel> for u8 {
    fn from(value: Atmega32u4Channel) -> Self {
        match value {
            Atmega32u4Channel::Adc0 => 0b000000,
            Atmega32u4Channel::Adc1 => 0b000001,
            Atmega32u4Channel::Adc4 => 0b000100,
            Atmega32u4Channel::Adc5 => 0b000101,
            Atmega32u4Channel::Adc6 => 0b000110,
            Atmega32u4Channel::Adc7 => 0b000111,
            Atmega32u4Channel::BandGap => 0b011110,
            Atmega32u4Channel::Gnd => 0b011111,
            Atmega32u4Channel::Adc8 => 0b100000,
            Atmega32u4Channel::Adc9 => 0b100001,
            Atmega32u4Channel::Adc10 => 0b100010,
            Atmega32u4Channel::Adc11 => 0b100011,
            Atmega32u4Channel::Adc12 => 0b100100,
            Atmega32u4Channel::Adc13 => 0b100101,
            Atmega32u4Channel::Temperature => 0b100111,
        }
    }
}

impl HardwareProfile for Atmega32u4 {
    type Channel = Atmega32u4Channel;

    const BAND_GAP: Atmega32u4Channel = Atmega32u4Channel::BandGap;
    const GROUND: Atmega32u4Channel = Atmega32u4Channel::Gnd;
    const DEFAULT_CHANNEL: Atmega32u4Channel = Atmega32u4Channel::Adc0;

    fn channels() -> &'static [Atmega32u4Channel] {
        use Atmega32u4Channel::*;
        &[
            Adc0,
            Adc1,
            Adc4,
            Adc5,
            Adc6,
            Adc7,
            BandGap,
            Gnd,
            Adc8,
            Adc9,
            Adc10,
            Adc11,
            Adc12,
            Adc13,
            Temperature,
        ]
    }

    fn apply_channel<R: RegisterFile>(registers: &R, channel: Atmega32u4Channel) {
        let mux = u8::from(channel);
        registers.modify(Register::Admux, |admux| {
            admux.set_bits(0..5, mux.get_bits(0..5));
        });
        registers.modify(Register::Adcsrb, |adcsrb| {
            adcsrb.set_bit(adcsrb::MUX5, mux.get_bit(5));
        });
    }

    fn supports_trigger(_source: TriggerSource) -> bool {
        true
    }
}
