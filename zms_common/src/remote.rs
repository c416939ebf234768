//! Remote controller datagrams.
//!
//! The wireless transport hands over whole datagrams. Their size alone tells
//! what they carry:
//!
//! | Size | Payload |
//! |------|---------|
//! | 16   | [`ControlPacket`]: four little-endian `f32` joystick axes |
//! | 1    | [`UiEvent`]: menu navigation code |
//! | else | unknown, reported and dropped |

use crate::consts::{CONTROL_PACKET_SIZE, UI_EVENT_SIZE};
use static_assertions::const_assert_eq;

/// Dual joystick state: 4 × f32 = 16 bytes.
///
/// Axes are nominally in `[-1.0, 1.0]` but are not clamped on receipt;
/// the actuator mappers clamp on their side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct ControlPacket {
    /// Left stick, horizontal.
    pub left_x: f32,
    /// Left stick, vertical.
    pub left_y: f32,
    /// Right stick, horizontal.
    pub right_x: f32,
    /// Right stick, vertical.
    pub right_y: f32,
}

const_assert_eq!(core::mem::size_of::<ControlPacket>(), CONTROL_PACKET_SIZE);

impl ControlPacket {
    /// All axes centered.
    pub const ZERO: Self = Self {
        left_x: 0.0,
        left_y: 0.0,
        right_x: 0.0,
        right_y: 0.0,
    };

    /// Decode from the wire layout.
    pub fn from_bytes(bytes: &[u8; CONTROL_PACKET_SIZE]) -> Self {
        let axis = |i: usize| {
            f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        };
        Self {
            left_x: axis(0),
            left_y: axis(4),
            right_x: axis(8),
            right_y: axis(12),
        }
    }

    /// Encode to the wire layout.
    pub fn to_bytes(&self) -> [u8; CONTROL_PACKET_SIZE] {
        let mut out = [0u8; CONTROL_PACKET_SIZE];
        for (chunk, value) in out
            .chunks_exact_mut(4)
            .zip([self.left_x, self.left_y, self.right_x, self.right_y])
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

/// Menu navigation event sent by the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum UiEvent {
    /// Unrecognized code.
    #[default]
    None = 0x00,
    /// Redraw the current page.
    Reload = 0x10,
    /// Activate the selected item.
    Click = 0x20,
    /// Step left.
    Left = 0x30,
    /// Step right.
    Right = 0x31,
    /// Step up.
    Up = 0x40,
    /// Step down.
    Down = 0x41,
}

impl UiEvent {
    /// Decode a code byte. Unknown codes map to `UiEvent::None`.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x10 => Self::Reload,
            0x20 => Self::Click,
            0x30 => Self::Left,
            0x31 => Self::Right,
            0x40 => Self::Up,
            0x41 => Self::Down,
            _ => Self::None,
        }
    }

    /// Wire code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// A classified remote datagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inbound {
    /// Joystick state.
    Control(ControlPacket),
    /// Menu event.
    Ui(UiEvent),
    /// Datagram of unexpected size.
    Unknown(usize),
}

impl Inbound {
    /// Classify a datagram by its size.
    pub fn classify(datagram: &[u8]) -> Self {
        if let Ok(bytes) = <&[u8; CONTROL_PACKET_SIZE]>::try_from(datagram) {
            return Self::Control(ControlPacket::from_bytes(bytes));
        }

        if datagram.len() == UI_EVENT_SIZE {
            return Self::Ui(UiEvent::from_code(datagram[0]));
        }

        Self::Unknown(datagram.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_packet_wire_layout_is_little_endian() {
        let packet = ControlPacket {
            left_x: 1.0,
            left_y: -0.5,
            right_x: 0.25,
            right_y: 0.0,
        };
        let bytes = packet.to_bytes();

        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-0.5f32).to_le_bytes());
        assert_eq!(ControlPacket::from_bytes(&bytes), packet);
    }

    #[test]
    fn classify_by_size() {
        let packet = ControlPacket {
            left_y: 0.75,
            ..ControlPacket::ZERO
        };
        assert_eq!(
            Inbound::classify(&packet.to_bytes()),
            Inbound::Control(packet)
        );
        assert_eq!(Inbound::classify(&[0x20]), Inbound::Ui(UiEvent::Click));
        assert_eq!(Inbound::classify(&[0x99]), Inbound::Ui(UiEvent::None));
        assert_eq!(Inbound::classify(&[]), Inbound::Unknown(0));
        assert_eq!(Inbound::classify(&[0u8; 15]), Inbound::Unknown(15));
        assert_eq!(Inbound::classify(&[0u8; 17]), Inbound::Unknown(17));
    }

    #[test]
    fn ui_codes_round_trip() {
        for event in [
            UiEvent::Reload,
            UiEvent::Click,
            UiEvent::Left,
            UiEvent::Right,
            UiEvent::Up,
            UiEvent::Down,
        ] {
            assert_eq!(UiEvent::from_code(event.code()), event);
        }
    }

    #[test]
    fn out_of_range_axes_are_kept() {
        let packet = ControlPacket {
            left_x: 3.0,
            ..ControlPacket::ZERO
        };
        assert_eq!(ControlPacket::from_bytes(&packet.to_bytes()).left_x, 3.0);
    }
}
