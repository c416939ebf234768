//! Message catalogue of the bridge.
//!
//! Host to robot ([`Instruction`]):
//!
//! | Code | Name           | Arguments                     |
//! |------|----------------|-------------------------------|
//! | 0x00 | GetMillis      | -                             |
//! | 0x01 | SetManipulator | arm: u8, claw: u8 (0xFF = off)|
//! | 0x02 | GetDistances   | -                             |
//! | 0x03 | SetMotors      | left: i16, right: i16         |
//!
//! Robot to host ([`Telemetry`]):
//!
//! | Code | Name      | Arguments                    |
//! |------|-----------|------------------------------|
//! | 0x00 | Millis    | u32                          |
//! | 0x01 | Log       | len: u8, bytes[len]          |
//! | 0x02 | Distances | left: u16, right: u16 (mm)   |

use super::error::BridgeError;
use super::stream::{InputStream, OutputStream};
use crate::consts::{AXIS_DISABLE_CODE, MAX_LOG_PAYLOAD, MOTOR_COMMAND_FULL_SCALE};
use crate::settings::Millimeters;
use std::io;

/// A message with a fixed opcode and a fixed argument schema.
pub trait Message: Sized {
    /// Opcode written before the arguments.
    fn opcode(&self) -> u8;

    /// Write the arguments (not the opcode).
    fn encode_args<W: OutputStream + ?Sized>(&self, out: &mut W) -> io::Result<()>;

    /// Read the arguments of `code` and build the message.
    ///
    /// # Errors
    /// `UnknownOpcode` for codes outside the catalogue, `ArgumentReadFail`
    /// for truncated arguments.
    fn decode<R: InputStream + ?Sized>(code: u8, input: &mut R) -> Result<Self, BridgeError>;
}

/// Instruction opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Request a `Millis` reply.
    GetMillis = 0x00,
    /// Command both manipulator axes.
    SetManipulator = 0x01,
    /// Request a `Distances` reply.
    GetDistances = 0x02,
    /// Command both drive motors.
    SetMotors = 0x03,
}

impl Opcode {
    /// Every instruction, indexed by code.
    pub const ALL: [Self; 4] = [
        Self::GetMillis,
        Self::SetManipulator,
        Self::GetDistances,
        Self::SetMotors,
    ];

    /// Look up a code in the table.
    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

/// Target of one manipulator axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisCommand {
    /// Move to the angle in degrees.
    Angle(u8),
    /// Release the axis (duty 0).
    Disable,
}

impl AxisCommand {
    /// Decode a wire byte.
    #[inline]
    pub const fn from_code(code: u8) -> Self {
        if code == AXIS_DISABLE_CODE {
            Self::Disable
        } else {
            Self::Angle(code)
        }
    }

    /// Wire byte.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Self::Angle(angle) => angle,
            Self::Disable => AXIS_DISABLE_CODE,
        }
    }
}

/// Clamp a `SetMotors` argument to ±1000 and scale it to `[-1.0, 1.0]`.
#[inline]
pub fn normalize_motor_command(value: i16) -> f32 {
    let full_scale = MOTOR_COMMAND_FULL_SCALE;
    f32::from(value.clamp(-full_scale, full_scale)) / f32::from(full_scale)
}

/// Host to robot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Ask for the robot's uptime.
    GetMillis,
    /// Drive the manipulator.
    SetManipulator {
        /// Arm axis target.
        arm: AxisCommand,
        /// Claw axis target.
        claw: AxisCommand,
    },
    /// Ask for both distance readings.
    GetDistances,
    /// Drive the wheels; each value is a fraction of ±1000.
    SetMotors {
        /// Left motor command.
        left: i16,
        /// Right motor command.
        right: i16,
    },
}

impl Instruction {
    /// Opcode of this instruction.
    pub const fn kind(&self) -> Opcode {
        match self {
            Self::GetMillis => Opcode::GetMillis,
            Self::SetManipulator { .. } => Opcode::SetManipulator,
            Self::GetDistances => Opcode::GetDistances,
            Self::SetMotors { .. } => Opcode::SetMotors,
        }
    }
}

impl Message for Instruction {
    fn opcode(&self) -> u8 {
        self.kind() as u8
    }

    fn encode_args<W: OutputStream + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match *self {
            Self::GetMillis | Self::GetDistances => Ok(()),
            Self::SetManipulator { arm, claw } => {
                out.write_u8(arm.code())?;
                out.write_u8(claw.code())
            }
            Self::SetMotors { left, right } => {
                out.write_i16(left)?;
                out.write_i16(right)
            }
        }
    }

    fn decode<R: InputStream + ?Sized>(code: u8, input: &mut R) -> Result<Self, BridgeError> {
        let opcode = Opcode::from_code(code).ok_or(BridgeError::UnknownOpcode(code))?;
        let args = |_: io::Error| BridgeError::ArgumentReadFail(code);

        Ok(match opcode {
            Opcode::GetMillis => Self::GetMillis,
            Opcode::SetManipulator => {
                let arm = input.read_u8().map_err(args)?;
                let claw = input.read_u8().map_err(args)?;
                Self::SetManipulator {
                    arm: AxisCommand::from_code(arm),
                    claw: AxisCommand::from_code(claw),
                }
            }
            Opcode::GetDistances => Self::GetDistances,
            Opcode::SetMotors => {
                let left = input.read_i16().map_err(args)?;
                let right = input.read_i16().map_err(args)?;
                Self::SetMotors { left, right }
            }
        })
    }
}

/// Bounded log payload.
pub type LogPayload = heapless::Vec<u8, MAX_LOG_PAYLOAD>;

/// Robot to host message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Telemetry {
    /// Robot uptime in milliseconds.
    Millis(u32),
    /// One log line.
    Log(LogPayload),
    /// Distance readings in millimeters, saturated to `u16`.
    Distances {
        /// Left sensor.
        left: u16,
        /// Right sensor.
        right: u16,
    },
}

impl Telemetry {
    /// `Millis` opcode.
    pub const MILLIS: u8 = 0x00;
    /// `Log` opcode.
    pub const LOG: u8 = 0x01;
    /// `Distances` opcode.
    pub const DISTANCES: u8 = 0x02;

    /// Log message from text, truncated to `MAX_LOG_PAYLOAD` bytes.
    pub fn log(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut payload = LogPayload::new();
        for &byte in &bytes[..bytes.len().min(MAX_LOG_PAYLOAD)] {
            if payload.push(byte).is_err() {
                break;
            }
        }
        Self::Log(payload)
    }

    /// Distances message from millimeter readings, clamped to the `u16`
    /// range. NaN saturates to `u16::MAX` (nothing in range).
    pub fn distances(left_mm: Millimeters, right_mm: Millimeters) -> Self {
        let saturate = |mm: Millimeters| {
            if mm.is_nan() {
                u16::MAX
            } else {
                mm.round().clamp(0.0, f64::from(u16::MAX)) as u16
            }
        };
        Self::Distances {
            left: saturate(left_mm),
            right: saturate(right_mm),
        }
    }
}

impl Message for Telemetry {
    fn opcode(&self) -> u8 {
        match self {
            Self::Millis(_) => Self::MILLIS,
            Self::Log(_) => Self::LOG,
            Self::Distances { .. } => Self::DISTANCES,
        }
    }

    fn encode_args<W: OutputStream + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Self::Millis(ms) => out.write_u32(*ms),
            Self::Log(payload) => {
                out.write_u8(payload.len() as u8)?;
                out.write_bytes(payload)
            }
            Self::Distances { left, right } => {
                out.write_u16(*left)?;
                out.write_u16(*right)
            }
        }
    }

    fn decode<R: InputStream + ?Sized>(code: u8, input: &mut R) -> Result<Self, BridgeError> {
        let args = |_: io::Error| BridgeError::ArgumentReadFail(code);

        match code {
            Self::MILLIS => Ok(Self::Millis(input.read_u32().map_err(args)?)),
            Self::LOG => {
                let len = usize::from(input.read_u8().map_err(args)?);
                let mut buf = [0u8; MAX_LOG_PAYLOAD];
                input.read_bytes(&mut buf[..len]).map_err(args)?;
                let mut payload = LogPayload::new();
                for &byte in &buf[..len] {
                    if payload.push(byte).is_err() {
                        break;
                    }
                }
                Ok(Self::Log(payload))
            }
            Self::DISTANCES => {
                let left = input.read_u16().map_err(args)?;
                let right = input.read_u16().map_err(args)?;
                Ok(Self::Distances { left, right })
            }
            _ => Err(BridgeError::UnknownOpcode(code)),
        }
    }
}
