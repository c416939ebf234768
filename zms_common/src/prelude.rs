//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use zms_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use zms_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::settings::RobotSettings;

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CYCLE_TIME_MS, DEFAULT_LINK_TIMEOUT_MS};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::{Board, Clock, HalError};

// ─── Remote ─────────────────────────────────────────────────────────
pub use crate::remote::{ControlPacket, Inbound, UiEvent};

// ─── Bridge ─────────────────────────────────────────────────────────
pub use crate::bridge::{BridgeChannel, BridgeError, Instruction, Telemetry};

/// Default service cycle time as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_millis(DEFAULT_CYCLE_TIME_MS);

/// Default link timeout as Duration.
pub const DEFAULT_LINK_TIMEOUT: Duration = Duration::from_millis(DEFAULT_LINK_TIMEOUT_MS);
