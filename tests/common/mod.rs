//! Simulated ADC for driving the driver on the host.
//!
//! The fake behaves like the ATmega ADC as far as the driver can tell:
//!
//! - Setting ADSC with ADEN set starts a conversion, which finishes after a fixed
//!   number of ADCSRA reads (polls), or when the test calls [`FakeAdc::complete`].
//! - A finished conversion latches the reading for the selected channel into
//!   ADCL/ADCH and sets ADIF. In free running mode the next conversion starts
//!   straight away.
//! - ADIF is cleared by writing a one to it.
//!
//! Every write is logged, together with whether a conversion was in progress.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use atmega_adc_hal::CompletionNotifier;
use atmega_adc_hal::analog::TriggerSource;
use atmega_adc_hal::profile::HardwareProfile;
use atmega_adc_hal::registers::{Register, RegisterFile, adcsra, adcsrb};
use bit_field::BitField;
use embedded_hal::delay::DelayNs;

/// Polls a conversion takes unless the test says otherwise.
pub const DEFAULT_LATENCY: u32 = 4;

/// Reading returned for channels without an explicit reading.
pub const DEFAULT_READING: u16 = 0x155;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    pub register: Register,
    pub value: u8,
    pub while_converting: bool,
}

#[derive(Debug)]
pub struct FakeAdc {
    admux: Cell<u8>,
    adcsra: Cell<u8>,
    adcsrb: Cell<u8>,
    adcl: Cell<u8>,
    adch: Cell<u8>,
    converting: Cell<bool>,
    polls_left: Cell<u32>,
    latency: Cell<u32>,
    stuck: Cell<bool>,
    readings: RefCell<HashMap<u8, u16>>,
    writes: RefCell<Vec<WriteRecord>>,
    result_reads: RefCell<Vec<Register>>,
    mux_changes_while_converting: Cell<u32>,
    conversions: Cell<u32>,
}

impl Default for FakeAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAdc {
    /// All registers zero, as after reset.
    pub fn new() -> Self {
        Self {
            admux: Cell::new(0),
            adcsra: Cell::new(0),
            adcsrb: Cell::new(0),
            adcl: Cell::new(0),
            adch: Cell::new(0),
            converting: Cell::new(false),
            polls_left: Cell::new(0),
            latency: Cell::new(DEFAULT_LATENCY),
            stuck: Cell::new(false),
            readings: RefCell::new(HashMap::new()),
            writes: RefCell::new(Vec::new()),
            result_reads: RefCell::new(Vec::new()),
            mux_changes_while_converting: Cell::new(0),
            conversions: Cell::new(0),
        }
    }

    /// Make `channel` read `value` from now on.
    pub fn set_reading(&self, channel: impl Into<u8>, value: u16) {
        self.readings.borrow_mut().insert(channel.into(), value);
    }

    /// Never finish a conversion.
    pub fn set_stuck(&self, stuck: bool) {
        self.stuck.set(stuck);
    }

    pub fn set_latency(&self, polls: u32) {
        self.latency.set(polls);
    }

    /// Set a register without logging a write.
    pub fn poke(&self, register: Register, value: u8) {
        self.cell(register).set(value);
    }

    /// Current register values, without side effects.
    pub fn peek(&self, register: Register) -> u8 {
        match register {
            Register::Adcsra => {
                let mut value = self.adcsra.get();
                value.set_bit(adcsra::ADSC, self.converting.get());
                value
            }
            other => self.cell(other).get(),
        }
    }

    /// ADMUX, ADCSRA and ADCSRB.
    pub fn snapshot(&self) -> [u8; 3] {
        [
            self.peek(Register::Admux),
            self.peek(Register::Adcsra),
            self.peek(Register::Adcsrb),
        ]
    }

    /// Full multiplexer code: MUX[4:0] from ADMUX and MUX5 from ADCSRB.
    pub fn mux(&self) -> u8 {
        let mut mux = self.admux.get().get_bits(0..5);
        mux.set_bit(5, self.adcsrb.get().get_bit(adcsrb::MUX5));
        mux
    }

    pub fn is_busy(&self) -> bool {
        self.converting.get()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn clear_log(&self) {
        self.writes.borrow_mut().clear();
        self.result_reads.borrow_mut().clear();
    }

    pub fn result_reads(&self) -> Vec<Register> {
        self.result_reads.borrow().clone()
    }

    pub fn mux_changes_while_converting(&self) -> u32 {
        self.mux_changes_while_converting.get()
    }

    pub fn conversions(&self) -> u32 {
        self.conversions.get()
    }

    /// Let time pass until the current conversion finishes, then take the
    /// interrupt vector if the completion interrupt is enabled.
    ///
    /// Returns the value delivered through the notifier, if the vector was taken.
    pub fn complete<P: HardwareProfile>(&self, notifier: &CompletionNotifier<P>) -> Option<u16> {
        if self.converting.get() && !self.stuck.get() {
            self.finish();
        }
        let mut flags = self.adcsra.get();
        if flags.get_bit(adcsra::ADIF) && flags.get_bit(adcsra::ADIE) {
            // The hardware clears ADIF when the vector is taken.
            flags.set_bit(adcsra::ADIF, false);
            self.adcsra.set(flags);
            Some(notifier.on_conversion_complete(self))
        } else {
            None
        }
    }

    fn cell(&self, register: Register) -> &Cell<u8> {
        match register {
            Register::Admux => &self.admux,
            Register::Adcsra => &self.adcsra,
            Register::Adcsrb => &self.adcsrb,
            Register::Adcl => &self.adcl,
            Register::Adch => &self.adch,
        }
    }

    fn begin(&self) {
        self.converting.set(true);
        self.polls_left.set(self.latency.get());
    }

    fn finish(&self) {
        let reading = self
            .readings
            .borrow()
            .get(&self.mux())
            .copied()
            .unwrap_or(DEFAULT_READING);
        let [low, high] = reading.to_le_bytes();
        self.adcl.set(low);
        self.adch.set(high);
        self.conversions.set(self.conversions.get() + 1);

        let mut flags = self.adcsra.get();
        flags.set_bit(adcsra::ADIF, true);
        self.adcsra.set(flags);

        let free_running = flags.get_bit(adcsra::ADATE)
            && self.adcsrb.get().get_bits(adcsrb::ADTS) == u8::from(TriggerSource::FreeRunning);
        if free_running {
            self.begin();
        } else {
            self.converting.set(false);
        }
    }
}

impl RegisterFile for FakeAdc {
    fn read(&self, register: Register) -> u8 {
        match register {
            Register::Adcsra => {
                if self.converting.get() && !self.stuck.get() {
                    let left = self.polls_left.get().saturating_sub(1);
                    self.polls_left.set(left);
                    if left == 0 {
                        self.finish();
                    }
                }
            }
            Register::Adcl | Register::Adch => self.result_reads.borrow_mut().push(register),
            _ => {}
        }
        self.peek(register)
    }

    fn write(&self, register: Register, value: u8) {
        let converting = self.converting.get();
        self.writes.borrow_mut().push(WriteRecord {
            register,
            value,
            while_converting: converting,
        });

        match register {
            Register::Adcsra => {
                let old = self.adcsra.get();
                let mut new = value;
                // Write one to clear, zero leaves the flag alone.
                let flag = old.get_bit(adcsra::ADIF) && !value.get_bit(adcsra::ADIF);
                new.set_bit(adcsra::ADIF, flag);
                new.set_bit(adcsra::ADSC, false);
                self.adcsra.set(new);

                if !new.get_bit(adcsra::ADEN) {
                    // Powering down aborts a conversion.
                    self.converting.set(false);
                } else if value.get_bit(adcsra::ADSC) && !converting {
                    self.begin();
                }
            }
            Register::Admux | Register::Adcsrb => {
                let mux_before = self.mux();
                self.cell(register).set(value);
                if converting && self.mux() != mux_before {
                    self.mux_changes_while_converting
                        .set(self.mux_changes_while_converting.get() + 1);
                }
            }
            Register::Adcl | Register::Adch => {}
        }
    }
}

/// Delay that only adds up how long it was asked to wait.
#[derive(Debug, Default)]
pub struct FakeDelay {
    pub total_ns: u64,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
