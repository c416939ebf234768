//! In-memory board model.
//!
//! Models the constraints of the ESP32-class controller the robot runs on:
//!
//! - GPIO `0..=39`; pins `34..=39` are input-only
//! - 16 PWM channels fed from an 80 MHz source clock, so
//!   `frequency * 2^resolution` must not exceed 80 MHz
//! - ADC inputs sampled at a per-pin resolution
//!
//! Test and bench code drives inputs with [`SimulationBoard::set_input`],
//! [`SimulationBoard::pulse`] and [`SimulationBoard::set_analog`], and
//! inspects outputs with the `output_level`/`channel`/`analog_output`
//! accessors.

use crate::clock::{ManualClock, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use zms_common::consts::{ADC_RESOLUTION_BITS, MAX_PWM_CHANNEL};
use zms_common::hal::{
    Adc, Board, Channel, Clock, Edge, EdgeHandler, EdgeInterrupts, Gpio, HalError, Pin, Pwm,
};

/// Number of GPIO pins.
pub const PIN_COUNT: Pin = 40;

/// First input-only pin.
pub const FIRST_INPUT_ONLY_PIN: Pin = 34;

/// PWM source clock.
pub const PWM_SOURCE_CLOCK_HZ: u64 = 80_000_000;

/// Widest PWM counter the peripheral supports.
pub const MAX_PWM_RESOLUTION_BITS: u8 = 20;

/// ADC resolution used before `configure_analog_input`.
const DEFAULT_ADC_RESOLUTION_BITS: u8 = 12;

/// Function a pin has been configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Digital input
    Input,
    /// Digital or PWM output
    Output,
    /// ADC input
    Analog,
}

/// Snapshot of one PWM channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    /// Configured frequency
    pub frequency_hz: u32,
    /// Configured counter width
    pub resolution_bits: u8,
    /// Last written duty
    pub duty: u32,
    /// Pins the channel is routed to, in attach order
    pub pins: Vec<Pin>,
}

struct Interrupt {
    edge: Edge,
    handler: Arc<dyn EdgeHandler>,
}

#[derive(Default)]
struct BoardState {
    modes: HashMap<Pin, PinMode>,
    levels: HashMap<Pin, bool>,
    channels: HashMap<Channel, ChannelState>,
    analog_write: Option<(u32, u8)>,
    analog_outputs: HashMap<Pin, u32>,
    analog_inputs: HashMap<Pin, u16>,
    adc_resolution: HashMap<Pin, u8>,
    interrupts: HashMap<Pin, Interrupt>,
}

/// Simulated controller board.
pub struct SimulationBoard {
    clock: Arc<dyn Clock>,
    state: Mutex<BoardState>,
}

impl SimulationBoard {
    /// Board driven by `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Board with a [`ManualClock`], returned alongside for the caller to advance.
    pub fn with_manual_clock() -> (Arc<Self>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let board = Arc::new(Self::new(clock.clone()));
        (board, clock)
    }

    /// Drive an input pin level and fire its interrupt on a qualifying edge.
    ///
    /// The handler runs after the board lock is released, so it may read
    /// other pins.
    pub fn set_input(&self, pin: Pin, level: bool) {
        let handler = {
            let mut state = self.state.lock();
            let previous = state.levels.insert(pin, level).unwrap_or(false);
            state
                .interrupts
                .get(&pin)
                .filter(|irq| irq.edge.matches(previous, level))
                .map(|irq| irq.handler.clone())
        };

        if let Some(handler) = handler {
            trace!("edge interrupt on pin {}", pin);
            handler.on_edge(self);
        }
    }

    /// Drive `pin` high then low.
    pub fn pulse(&self, pin: Pin) {
        self.set_input(pin, true);
        self.set_input(pin, false);
    }

    /// Set the raw value the ADC reports for `pin` before resolution clamping.
    pub fn set_analog(&self, pin: Pin, value: u16) {
        self.state.lock().analog_inputs.insert(pin, value);
    }

    /// Level of an output pin, `None` if `pin` is not an output.
    pub fn output_level(&self, pin: Pin) -> Option<bool> {
        let state = self.state.lock();
        match state.modes.get(&pin) {
            Some(PinMode::Output) => Some(state.levels.get(&pin).copied().unwrap_or(false)),
            _ => None,
        }
    }

    /// Configured function of `pin`.
    pub fn pin_mode(&self, pin: Pin) -> Option<PinMode> {
        self.state.lock().modes.get(&pin).copied()
    }

    /// Snapshot of `channel`, `None` if it was never set up.
    pub fn channel(&self, channel: Channel) -> Option<ChannelState> {
        self.state.lock().channels.get(&channel).cloned()
    }

    /// Last duty written to `channel`.
    pub fn channel_duty(&self, channel: Channel) -> Option<u32> {
        self.state.lock().channels.get(&channel).map(|c| c.duty)
    }

    /// Last `analog_write` duty on `pin`.
    pub fn analog_output(&self, pin: Pin) -> Option<u32> {
        self.state.lock().analog_outputs.get(&pin).copied()
    }

    /// Whether an edge handler is attached to `pin`.
    pub fn has_interrupt(&self, pin: Pin) -> bool {
        self.state.lock().interrupts.contains_key(&pin)
    }

    fn check_pin(pin: Pin) -> Result<(), HalError> {
        if pin < PIN_COUNT {
            Ok(())
        } else {
            Err(HalError::PinUnavailable(pin))
        }
    }

    fn check_output_pin(pin: Pin) -> Result<(), HalError> {
        Self::check_pin(pin)?;
        if pin >= FIRST_INPUT_ONLY_PIN {
            return Err(HalError::PinUnavailable(pin));
        }
        Ok(())
    }

    fn pwm_reachable(frequency_hz: u32, resolution_bits: u8) -> bool {
        frequency_hz > 0
            && (1..=MAX_PWM_RESOLUTION_BITS).contains(&resolution_bits)
            && u64::from(frequency_hz) << resolution_bits <= PWM_SOURCE_CLOCK_HZ
    }
}

impl Gpio for SimulationBoard {
    fn configure_input(&self, pin: Pin) -> Result<(), HalError> {
        Self::check_pin(pin)?;
        self.state.lock().modes.insert(pin, PinMode::Input);
        Ok(())
    }

    fn configure_output(&self, pin: Pin) -> Result<(), HalError> {
        Self::check_output_pin(pin)?;
        let mut state = self.state.lock();
        state.modes.insert(pin, PinMode::Output);
        state.levels.entry(pin).or_insert(false);
        Ok(())
    }

    fn read(&self, pin: Pin) -> bool {
        self.state.lock().levels.get(&pin).copied().unwrap_or(false)
    }

    fn write(&self, pin: Pin, high: bool) {
        let mut state = self.state.lock();
        if state.modes.get(&pin) == Some(&PinMode::Output) {
            state.levels.insert(pin, high);
        } else {
            trace!("write to non-output pin {} ignored", pin);
        }
    }
}

impl Pwm for SimulationBoard {
    fn setup_channel(
        &self,
        channel: Channel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<u32, HalError> {
        if channel > MAX_PWM_CHANNEL || !Self::pwm_reachable(frequency_hz, resolution_bits) {
            return Err(HalError::PwmSetupFailed {
                channel,
                frequency_hz,
                resolution_bits,
            });
        }

        let mut state = self.state.lock();
        let entry = state.channels.entry(channel).or_insert(ChannelState {
            frequency_hz,
            resolution_bits,
            duty: 0,
            pins: Vec::new(),
        });
        entry.frequency_hz = frequency_hz;
        entry.resolution_bits = resolution_bits;
        entry.duty = 0;

        debug!(
            "channel {} set up at {} Hz / {} bits",
            channel, frequency_hz, resolution_bits
        );
        Ok(frequency_hz)
    }

    fn attach_pin(&self, pin: Pin, channel: Channel) -> Result<(), HalError> {
        Self::check_output_pin(pin)?;

        let mut state = self.state.lock();
        let Some(entry) = state.channels.get_mut(&channel) else {
            return Err(HalError::InitFailed(format!(
                "channel {channel} attached before setup"
            )));
        };
        if !entry.pins.contains(&pin) {
            entry.pins.push(pin);
        }
        state.modes.insert(pin, PinMode::Output);
        Ok(())
    }

    fn write_duty(&self, channel: Channel, duty: u32) {
        let mut state = self.state.lock();
        match state.channels.get_mut(&channel) {
            Some(entry) => {
                let max = (1u32 << entry.resolution_bits) - 1;
                entry.duty = duty.min(max);
            }
            None => trace!("duty write to unconfigured channel {} ignored", channel),
        }
    }

    fn configure_analog_write(&self, frequency_hz: u32, resolution_bits: u8) -> Result<(), HalError> {
        if !Self::pwm_reachable(frequency_hz, resolution_bits) {
            return Err(HalError::PwmSetupFailed {
                channel: 0,
                frequency_hz,
                resolution_bits,
            });
        }
        self.state.lock().analog_write = Some((frequency_hz, resolution_bits));
        Ok(())
    }

    fn analog_write(&self, pin: Pin, duty: u32) {
        let mut state = self.state.lock();
        let bits = state
            .analog_write
            .map(|(_, bits)| bits)
            .unwrap_or(MAX_PWM_RESOLUTION_BITS);
        let max = (1u32 << bits) - 1;
        state.analog_outputs.insert(pin, duty.min(max));
    }
}

impl Adc for SimulationBoard {
    fn configure_analog_input(&self, pin: Pin, resolution_bits: u8) -> Result<(), HalError> {
        Self::check_pin(pin)?;
        if !ADC_RESOLUTION_BITS.contains(&resolution_bits) {
            return Err(HalError::ConfigError(format!(
                "ADC resolution {resolution_bits} outside {ADC_RESOLUTION_BITS:?}"
            )));
        }

        let mut state = self.state.lock();
        state.modes.insert(pin, PinMode::Analog);
        state.adc_resolution.insert(pin, resolution_bits);
        Ok(())
    }

    fn analog_read(&self, pin: Pin) -> u16 {
        let state = self.state.lock();
        let bits = state
            .adc_resolution
            .get(&pin)
            .copied()
            .unwrap_or(DEFAULT_ADC_RESOLUTION_BITS);
        let max = ((1u32 << bits) - 1) as u16;
        state.analog_inputs.get(&pin).copied().unwrap_or(0).min(max)
    }
}

impl EdgeInterrupts for SimulationBoard {
    fn attach_interrupt(
        &self,
        pin: Pin,
        edge: Edge,
        handler: Arc<dyn EdgeHandler>,
    ) -> Result<(), HalError> {
        Self::check_pin(pin)?;
        self.state
            .lock()
            .interrupts
            .insert(pin, Interrupt { edge, handler });
        Ok(())
    }

    fn detach_interrupt(&self, pin: Pin) {
        self.state.lock().interrupts.remove(&pin);
    }
}

impl Clock for SimulationBoard {
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn delay(&self, duration: Duration) {
        self.clock.delay(duration);
    }
}

impl Board for SimulationBoard {
    fn name(&self) -> &'static str {
        "simulation"
    }
}

/// Factory registered under `"simulation"`. Runs on wall time.
pub fn create_board() -> Arc<dyn Board> {
    Arc::new(SimulationBoard::new(Arc::new(SystemClock::new())))
}
