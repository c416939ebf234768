//! Board backend implementations.
//!
//! - [`simulation`] - In-memory board for development and testing
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `Board` capability traits from `zms_common::hal`
//! 3. Register the factory in [`register_builtin`]

pub mod simulation;

use crate::board_registry::BoardRegistry;

/// Register all built-in backends.
pub fn register_builtin(registry: &mut BoardRegistry) {
    registry.register("simulation", simulation::create_board);
}
