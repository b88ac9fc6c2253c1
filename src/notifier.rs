//! Delivery of conversion results from the completion interrupt.

use core::cell::Cell;
use core::marker::PhantomData;

use critical_section::Mutex;

use crate::analog::ConversionResult;
use crate::profile::HardwareProfile;
use crate::registers::RegisterFile;

/// Function called with each conversion result.
///
/// Handlers run in interrupt context. Keep them short, and do not call back into
/// the driver from them: starting, stopping, or configuring the ADC from a handler
/// races with code busy-waiting on the same ADC.
pub type CompletionHandler = fn(ConversionResult);

/// Hand-over point between the ADC completion interrupt and a registered handler.
///
/// The notifier is shared between the driver, which registers handlers through
/// [`Adc::configure`](crate::Adc::configure), and the platform's ADC interrupt
/// vector, which calls [`CompletionNotifier::on_conversion_complete`]. It is
/// usually a `static`:
///
/// ```rust,ignore
/// static NOTIFIER: CompletionNotifier<Atmega32u4> = CompletionNotifier::new();
///
/// #[avr_device::interrupt(atmega32u4)]
/// fn ADC() {
///     NOTIFIER.on_conversion_complete(&Mmio);
/// }
/// ```
///
/// The handler slot is only ever accessed inside a critical section, so an update
/// is a single indivisible step as far as the interrupt is concerned.
pub struct CompletionNotifier<P> {
    handler: Mutex<Cell<Option<CompletionHandler>>>,
    dispatching: Mutex<Cell<bool>>,
    _profile: PhantomData<P>,
}

impl<P> core::fmt::Debug for CompletionNotifier<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompletionNotifier")
            .field("handler", &self.handler())
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}

impl<P> Default for CompletionNotifier<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> CompletionNotifier<P> {
    /// Create a notifier with no handler registered.
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(Cell::new(None)),
            dispatching: Mutex::new(Cell::new(false)),
            _profile: PhantomData,
        }
    }

    /// The currently registered handler.
    pub fn handler(&self) -> Option<CompletionHandler> {
        critical_section::with(|cs| self.handler.borrow(cs).get())
    }

    /// Whether a handler is executing right now.
    pub fn is_dispatching(&self) -> bool {
        critical_section::with(|cs| self.dispatching.borrow(cs).get())
    }

    pub(crate) fn register(&self, handler: Option<CompletionHandler>) {
        critical_section::with(|cs| self.handler.borrow(cs).set(handler));
    }
}

impl<P: HardwareProfile> CompletionNotifier<P> {
    /// Interrupt entry point: read the finished conversion and pass it on.
    ///
    /// Call this from the ADC conversion complete interrupt vector, exactly once
    /// per interrupt. The result is read low byte first, then passed to the
    /// registered handler (if any) before this returns. Nothing is buffered: if
    /// conversions finish faster than they are handled, earlier results are lost.
    ///
    /// The hardware clears the completion flag when the vector is taken, so this
    /// does not touch it. The result is returned as well, for platforms that poll
    /// the flag instead of using the vector.
    pub fn on_conversion_complete<R: RegisterFile>(&self, registers: &R) -> ConversionResult {
        let value = P::read_result(registers);
        if let Some(handler) = self.handler() {
            critical_section::with(|cs| self.dispatching.borrow(cs).set(true));
            handler(value);
            critical_section::with(|cs| self.dispatching.borrow(cs).set(false));
        }
        value
    }
}
