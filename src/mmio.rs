//! Volatile access to the ADC registers of the running AVR.

#![allow(unsafe_code)]

use core::ptr::{read_volatile, write_volatile};

use crate::registers::{Register, RegisterFile};

// Same addresses on the ATmega328P and ATmega32U4 (extended I/O space).
const ADCL: *mut u8 = 0x78 as *mut u8;
const ADCH: *mut u8 = 0x79 as *mut u8;
const ADCSRA: *mut u8 = 0x7A as *mut u8;
const ADCSRB: *mut u8 = 0x7B as *mut u8;
const ADMUX: *mut u8 = 0x7C as *mut u8;

/// The ADC registers of the microcontroller this code runs on.
///
/// `Mmio` has no state, so the driver and the interrupt vector can each hold one.
/// Only one [`Adc`](crate::Adc) may exist at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mmio;

impl Mmio {
    fn address(register: Register) -> *mut u8 {
        match register {
            Register::Admux => ADMUX,
            Register::Adcsra => ADCSRA,
            Register::Adcsrb => ADCSRB,
            Register::Adcl => ADCL,
            Register::Adch => ADCH,
        }
    }
}

impl RegisterFile for Mmio {
    fn read(&self, register: Register) -> u8 {
        // SAFETY: the address is one of the ADC's memory-mapped registers, which
        // exist on every supported part and are always readable.
        unsafe { read_volatile(Self::address(register)) }
    }

    fn write(&self, register: Register, value: u8) {
        // SAFETY: as above. Writes have no effect beyond the ADC.
        unsafe { write_volatile(Self::address(register), value) }
    }
}
