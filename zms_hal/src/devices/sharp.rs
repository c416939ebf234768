//! Sharp IR analog distance sensor.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use zms_common::hal::{Adc, Board, Clock, HalError};
use zms_common::settings::{Millimeters, SharpSettings};

/// Calibration numerator: `distance = SCALE * samples / sum(samples)`.
const SCALE: Millimeters = 65_535.0;

/// Analog distance sensor with sample averaging.
pub struct Sharp {
    board: Arc<dyn Board>,
    settings: SharpSettings,
}

impl Sharp {
    /// Create a sensor with validated settings.
    pub fn new(board: Arc<dyn Board>, settings: SharpSettings) -> Result<Self, HalError> {
        settings.validate()?;
        Ok(Self { board, settings })
    }

    /// Configure the analog input.
    pub fn init(&self) -> Result<(), HalError> {
        info!(
            "sharp pin={} resolution={} samples={}",
            self.settings.pin, self.settings.resolution_bits, self.settings.samples
        );
        self.board
            .configure_analog_input(self.settings.pin, self.settings.resolution_bits)
    }

    /// One raw ADC sample.
    #[inline]
    pub fn read_raw(&self) -> u16 {
        self.board.analog_read(self.settings.pin)
    }

    /// Averaged distance. Blocks for `samples * sample_delay_ms`.
    ///
    /// Returns infinity when every sample reads zero.
    pub fn read_millimeters(&self) -> Millimeters {
        let delay = Duration::from_millis(u64::from(self.settings.sample_delay_ms));
        let mut sum = 0u32;
        for _ in 0..self.settings.samples {
            sum += u32::from(self.read_raw());
            self.board.delay(delay);
        }

        if sum == 0 {
            return Millimeters::INFINITY;
        }
        SCALE * f64::from(self.settings.samples) / f64::from(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationBoard;
    use zms_common::hal::Clock;

    #[test]
    fn averages_samples_and_waits_between_them() {
        let (board, clock) = SimulationBoard::with_manual_clock();
        let sensor = Sharp::new(board.clone(), SharpSettings::new(34, 12)).unwrap();
        sensor.init().unwrap();

        board.set_analog(34, 655);
        let start = clock.now();
        let mm = sensor.read_millimeters();

        assert!((mm - 100.05).abs() < 0.01, "{mm}");
        assert_eq!(clock.now() - start, Duration::from_millis(4));
    }

    #[test]
    fn zero_reading_is_infinite() {
        let (board, _clock) = SimulationBoard::with_manual_clock();
        let sensor = Sharp::new(board.clone(), SharpSettings::new(35, 10)).unwrap();
        sensor.init().unwrap();
        board.set_analog(35, 0);
        assert_eq!(sensor.read_millimeters(), f64::INFINITY);
    }

    #[test]
    fn raw_reading_saturates_at_resolution() {
        let (board, _clock) = SimulationBoard::with_manual_clock();
        let sensor = Sharp::new(board.clone(), SharpSettings::new(34, 10)).unwrap();
        sensor.init().unwrap();
        board.set_analog(34, 5000);
        assert_eq!(sensor.read_raw(), 1023);
    }

    #[test]
    fn missing_pin_is_rejected() {
        let (board, _clock) = SimulationBoard::with_manual_clock();
        let sensor = Sharp::new(board, SharpSettings::new(60, 10)).unwrap();
        assert_eq!(sensor.init(), Err(HalError::PinUnavailable(60)));
    }
}
