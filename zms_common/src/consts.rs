//! System-wide constants for the Zoomers workspace.
//!
//! Single source of truth for numeric limits and default paths.

use core::ops::RangeInclusive;

/// Highest PWM channel index available on the controller (16 channels).
pub const MAX_PWM_CHANNEL: u8 = 15;

/// Supported motor PWM resolutions in bits.
pub const MOTOR_RESOLUTION_BITS: RangeInclusive<u8> = 8..=12;

/// Supported servo PWM resolutions in bits.
pub const SERVO_RESOLUTION_BITS: RangeInclusive<u8> = 8..=16;

/// Supported ADC resolutions in bits.
pub const ADC_RESOLUTION_BITS: RangeInclusive<u8> = 1..=16;

/// Normalized commands with a smaller magnitude are treated as zero.
pub const NORMALIZED_DEAD_ZONE: f32 = 1e-2;

/// Default remote link silence window before failsafe, in milliseconds.
pub const DEFAULT_LINK_TIMEOUT_MS: u64 = 200;

/// Default service poll period, in milliseconds.
pub const DEFAULT_CYCLE_TIME_MS: u64 = 5;

/// Full-scale magnitude of a `SetMotors` argument.
pub const MOTOR_COMMAND_FULL_SCALE: i16 = 1000;

/// `SetManipulator` argument value meaning "release this axis".
pub const AXIS_DISABLE_CODE: u8 = 0xFF;

/// Size of a remote control packet datagram (4 x f32).
pub const CONTROL_PACKET_SIZE: usize = 16;

/// Size of a UI event datagram.
pub const UI_EVENT_SIZE: usize = 1;

/// Largest log payload carried by one `Log` telemetry message.
pub const MAX_LOG_PAYLOAD: usize = u8::MAX as usize;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/zms/robot.toml";

/// Default TCP address the bridge listens on.
pub const DEFAULT_BRIDGE_ADDR: &str = "127.0.0.1:5760";

/// Default UDP address the remote controller link listens on.
pub const DEFAULT_REMOTE_ADDR: &str = "0.0.0.0:5761";
