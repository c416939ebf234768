//! Pin, channel and edge types shared by board backends and drivers.

use serde::{Deserialize, Serialize};

/// Physical GPIO pin number.
pub type Pin = u8;

/// PWM peripheral channel index (`0..=MAX_PWM_CHANNEL`).
pub type Channel = u8;

/// Signal transition that triggers an edge interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// LOW -> HIGH transition.
    #[default]
    Rising,
    /// HIGH -> LOW transition.
    Falling,
}

impl Edge {
    /// Whether a `previous -> current` level change qualifies as this edge.
    #[inline]
    pub const fn matches(self, previous: bool, current: bool) -> bool {
        match self {
            Self::Rising => !previous && current,
            Self::Falling => previous && !current,
        }
    }
}
