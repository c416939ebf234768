//! Board backends by name.
//!
//! The robot binary picks its board with `--board <name>`. A backend is a
//! plain `fn() -> Arc<dyn Board>`, so real targets and the simulation sit
//! side by side. [`BoardRegistry::open`] goes one step further and brings
//! up the robot's devices on the chosen board.

use crate::periphery::Periphery;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use zms_common::hal::{Board, BoardFactory, HalError};
use zms_common::settings::RobotSettings;

/// Board backends known to this build, keyed by CLI name.
pub struct BoardRegistry {
    backends: BTreeMap<&'static str, BoardFactory>,
}

impl BoardRegistry {
    /// No backends.
    pub fn new() -> Self {
        Self {
            backends: BTreeMap::new(),
        }
    }

    /// Every backend compiled into this crate (`"simulation"` at least).
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_builtin(&mut registry);
        registry
    }

    /// Add a backend.
    ///
    /// # Panics
    /// Panics if `name` is taken. Two backends answering to one `--board`
    /// value is a build error.
    pub fn register(&mut self, name: &'static str, factory: BoardFactory) {
        if self.backends.insert(name, factory).is_some() {
            panic!("Board '{name}' is already registered");
        }
    }

    /// Factory for `name`.
    pub fn get_factory(&self, name: &str) -> Option<BoardFactory> {
        self.backends.get(name).copied()
    }

    /// Instantiate the board called `name`.
    ///
    /// # Errors
    /// `HalError::BoardNotFound` naming the backends that do exist.
    pub fn create_board(&self, name: &str) -> Result<Arc<dyn Board>, HalError> {
        let factory = self.get_factory(name).ok_or_else(|| {
            HalError::BoardNotFound(format!("'{name}' (available: {:?})", self.list_boards()))
        })?;
        let board = factory();
        info!("Board '{}' created ({})", name, board.name());
        Ok(board)
    }

    /// Create the board and initialize every device `settings` wires to it.
    ///
    /// # Errors
    /// Unknown board, invalid settings, or a device the board cannot host
    /// (input-only pin as output, PWM channel out of range, ...).
    pub fn open(&self, name: &str, settings: &RobotSettings) -> Result<Periphery, HalError> {
        let periphery = Periphery::new(self.create_board(name)?, settings)?;
        periphery.init()?;
        Ok(periphery)
    }

    /// Backend names in `--board` order (sorted).
    pub fn list_boards(&self) -> Vec<&'static str> {
        self.backends.keys().copied().collect()
    }
}

impl Default for BoardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::{self, SimulationBoard};

    /// Simulation with an obstacle 100 mm in front of the left sensor.
    fn obstacle_board() -> Arc<dyn Board> {
        let (board, _clock) = SimulationBoard::with_manual_clock();
        board.set_analog(34, 655);
        board
    }

    #[test]
    fn open_brings_up_devices_on_named_board() {
        let mut registry = BoardRegistry::with_builtin();
        registry.register("bench", obstacle_board);

        let periphery = registry.open("bench", &RobotSettings::default()).unwrap();
        let (left, right) = periphery.distances();
        assert!((left - 100.05).abs() < 0.01, "{left}");
        assert_eq!(right, f64::INFINITY);
    }

    #[test]
    fn open_rejects_wiring_the_board_cannot_host() {
        let registry = BoardRegistry::with_builtin();
        let mut settings = RobotSettings::default();
        settings.left_motor.pin_a = 36;

        assert_eq!(
            registry.open("simulation", &settings).err(),
            Some(HalError::PinUnavailable(36))
        );
    }

    #[test]
    fn unknown_board_lists_alternatives() {
        let registry = BoardRegistry::with_builtin();
        let Err(HalError::BoardNotFound(msg)) = registry.create_board("esp32") else {
            panic!("expected BoardNotFound");
        };
        assert!(msg.contains("esp32"), "{msg}");
        assert!(msg.contains("simulation"), "{msg}");
    }

    #[test]
    fn boards_listed_in_cli_order() {
        let mut registry = BoardRegistry::new();
        registry.register("sim_obstacle", obstacle_board);
        registry.register("esp32_sim", simulation::create_board);
        assert_eq!(registry.list_boards(), vec!["esp32_sim", "sim_obstacle"]);
        assert_eq!(BoardRegistry::with_builtin().list_boards(), vec!["simulation"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_board_name_panics() {
        let mut registry = BoardRegistry::with_builtin();
        registry.register("simulation", obstacle_board);
    }
}
