//! ADC register file and bit layout.
//!
//! The ADC is controlled through five 8-bit registers. The driver never touches
//! memory directly: every access goes through a [`RegisterFile`], which is
//! implemented by `mmio::Mmio` on AVR targets and by fakes in tests.

use bit_field::BitField;

/// One of the ADC's memory-mapped registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Multiplexer selection: reference voltage, left adjust, MUX\[4:0\].
    Admux,
    /// Control and status register A: enable, start, auto trigger, flag,
    /// interrupt enable, prescaler.
    Adcsra,
    /// Control and status register B: MUX5 (ATmega32U4) and trigger source.
    Adcsrb,
    /// Low byte of the conversion result.
    Adcl,
    /// High byte of the conversion result.
    Adch,
}

/// ADMUX bit positions.
pub mod admux {
    use core::ops::Range;

    /// REFS\[1:0\], reference selection.
    pub const REFS: Range<usize> = 6..8;
    /// Left adjust result.
    pub const ADLAR: usize = 5;
}

/// ADCSRA bit positions.
pub mod adcsra {
    use core::ops::Range;

    /// ADC enable.
    pub const ADEN: usize = 7;
    /// Start conversion. Reads as one while a conversion is in progress.
    pub const ADSC: usize = 6;
    /// Auto trigger enable.
    pub const ADATE: usize = 5;
    /// Conversion complete flag. Cleared by writing a one.
    pub const ADIF: usize = 4;
    /// Conversion complete interrupt enable.
    pub const ADIE: usize = 3;
    /// ADPS\[2:0\], prescaler selection.
    pub const ADPS: Range<usize> = 0..3;
}

/// ADCSRB bit positions.
pub mod adcsrb {
    use core::ops::Range;

    /// Extended channel selection bit (ATmega32U4 only).
    pub const MUX5: usize = 5;
    /// ADTS\[3:0\], auto trigger source.
    pub const ADTS: Range<usize> = 0..4;
}

/// Access to the ADC registers.
///
/// All methods take `&self`. Register access has no Rust-visible state, and the
/// completion interrupt needs to read the result registers while the driver holds
/// its own handle.
pub trait RegisterFile {
    /// Read the current value of a register.
    fn read(&self, register: Register) -> u8;

    /// Write a value to a register.
    fn write(&self, register: Register, value: u8);

    /// Read-modify-write a register.
    ///
    /// ADIF in ADCSRA is write-one-to-clear, so it is always written back as zero
    /// here. Writing back a set flag would silently discard a pending completion.
    /// ADSC read as one is also written back as zero: the conversion may finish
    /// between the read and the write, and a one would then start another.
    ///
    /// Nothing is written if `f` leaves the value unchanged.
    fn modify(&self, register: Register, f: impl FnOnce(&mut u8)) {
        let current = self.read(register);
        let mut value = current;
        f(&mut value);
        if value == current {
            return;
        }
        if register == Register::Adcsra {
            value.set_bit(adcsra::ADIF, false);
            if current.get_bit(adcsra::ADSC) {
                value.set_bit(adcsra::ADSC, false);
            }
        }
        self.write(register, value);
    }

    /// Whether a conversion is currently in progress (ADSC set).
    fn is_converting(&self) -> bool {
        self.read(Register::Adcsra).get_bit(adcsra::ADSC)
    }

    /// Whether the conversion complete flag is set.
    fn completion_flag(&self) -> bool {
        self.read(Register::Adcsra).get_bit(adcsra::ADIF)
    }

    /// Clear the conversion complete flag by writing a one to it.
    fn clear_completion_flag(&self) {
        let mut value = self.read(Register::Adcsra);
        value.set_bit(adcsra::ADSC, false);
        value.set_bit(adcsra::ADIF, true);
        self.write(Register::Adcsra, value);
    }
}

impl<T: RegisterFile + ?Sized> RegisterFile for &T {
    fn read(&self, register: Register) -> u8 {
        (**self).read(register)
    }

    fn write(&self, register: Register, value: u8) {
        (**self).write(register, value)
    }
}
