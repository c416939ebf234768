//! Interrupt-driven quadrature counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tracing::{debug, info};
use zms_common::hal::{Board, EdgeHandler, EdgeInterrupts, Gpio, HalError, Pin};
use zms_common::settings::{ConversionSettings, EncoderPins, Millimeters, Ticks};

/// Interrupt-side half of the counter: samples phase B and steps the count.
struct EdgeCounter {
    phase_b: Pin,
    ticks: AtomicI32,
}

impl EdgeHandler for EdgeCounter {
    fn on_edge(&self, gpio: &dyn Gpio) {
        if gpio.read(self.phase_b) {
            self.ticks.fetch_add(1, Ordering::Relaxed);
        } else {
            self.ticks.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

/// Signed tick counter fed by phase A edge interrupts.
///
/// On every configured edge of phase A the handler reads phase B: high
/// counts up, low counts down. The count is a single atomic word written
/// only by this counter's handler.
pub struct QuadratureCounter {
    board: Arc<dyn Board>,
    pins: EncoderPins,
    conversion: ConversionSettings,
    counter: Arc<EdgeCounter>,
}

impl QuadratureCounter {
    /// Create a counter with validated settings. Hardware is untouched until
    /// [`QuadratureCounter::init`].
    pub fn new(
        board: Arc<dyn Board>,
        pins: EncoderPins,
        conversion: ConversionSettings,
    ) -> Result<Self, HalError> {
        pins.validate()?;
        conversion.validate()?;

        Ok(Self {
            board,
            pins,
            conversion,
            counter: Arc::new(EdgeCounter {
                phase_b: pins.phase_b,
                ticks: AtomicI32::new(0),
            }),
        })
    }

    /// Configure both phases as inputs and enable the interrupt.
    pub fn init(&self) -> Result<(), HalError> {
        info!(
            "encoder phase_a={} phase_b={} edge={:?}",
            self.pins.phase_a, self.pins.phase_b, self.pins.edge
        );

        self.board.configure_input(self.pins.phase_a)?;
        self.board.configure_input(self.pins.phase_b)?;
        self.enable()
    }

    /// Attach the edge interrupt. The count is kept.
    pub fn enable(&self) -> Result<(), HalError> {
        let handler: Arc<dyn EdgeHandler> = self.counter.clone();
        self.board
            .attach_interrupt(self.pins.phase_a, self.pins.edge, handler)?;
        debug!("encoder on pin {} enabled", self.pins.phase_a);
        Ok(())
    }

    /// Detach the edge interrupt. The count is kept.
    pub fn disable(&self) {
        self.board.detach_interrupt(self.pins.phase_a);
        debug!("encoder on pin {} disabled", self.pins.phase_a);
    }

    /// Current count.
    #[inline]
    pub fn position(&self) -> Ticks {
        self.counter.ticks.load(Ordering::Relaxed)
    }

    /// Overwrite the count.
    #[inline]
    pub fn set_position(&self, ticks: Ticks) {
        self.counter.ticks.store(ticks, Ordering::Relaxed);
    }

    /// Current count in millimeters.
    #[inline]
    pub fn position_mm(&self) -> Millimeters {
        self.conversion.to_millimeters(self.position())
    }

    /// Overwrite the count from millimeters.
    #[inline]
    pub fn set_position_mm(&self, mm: Millimeters) {
        self.set_position(self.conversion.to_ticks(mm));
    }

    /// Tick/distance conversion in use.
    pub fn conversion(&self) -> &ConversionSettings {
        &self.conversion
    }
}
