//! Remote link supervision.
//!
//! The remote transport pushes control packets with
//! [`LinkSupervisor::update_control_packet`]; the service loop calls
//! [`LinkSupervisor::poll`] once per cycle.
//!
//! ```text
//!                update_control_packet
//!   ┌──────────────┐ ─────────────────► ┌───────────┐
//!   │ Disconnected │                    │ Connected │ ──► on_control(packet) every poll
//!   └──────────────┘ ◄───────────────── └───────────┘
//!                 silence > timeout:
//!                 packet := ZERO, on_disconnect() once
//! ```

use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};
use zms_common::remote::ControlPacket;
use zms_common::settings::LinkSettings;

/// Link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No packet within the timeout, or none ever received.
    #[default]
    Disconnected,
    /// Packets arriving.
    Connected,
}

/// Reactions to link supervision, chosen when the service is composed.
pub trait LinkHandler {
    /// Called on every poll while connected, with the latest packet.
    fn on_control(&mut self, packet: &ControlPacket);

    /// Called once per `Connected -> Disconnected` transition.
    fn on_disconnect(&mut self);
}

#[derive(Debug, Default)]
struct LinkInner {
    packet: ControlPacket,
    last_update: Duration,
    state: LinkState,
}

enum Action {
    Control(ControlPacket),
    Disconnect { silence: Duration },
}

/// Connection watchdog for the remote controller.
///
/// Packet, timestamp and state are updated under one lock so a poll never
/// sees a packet without its timestamp. Handlers run after the lock is
/// released.
#[derive(Debug)]
pub struct LinkSupervisor {
    timeout: Duration,
    inner: Mutex<LinkInner>,
}

impl LinkSupervisor {
    /// Supervisor starting `Disconnected` with a zero packet.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            inner: Mutex::new(LinkInner::default()),
        }
    }

    /// Supervisor from validated settings.
    pub fn from_settings(settings: &LinkSettings) -> Self {
        Self::new(settings.timeout())
    }

    /// Store a fresh packet received at `now` and mark the link connected.
    pub fn update_control_packet(&self, packet: ControlPacket, now: Duration) {
        let mut inner = self.inner.lock();
        inner.packet = packet;
        inner.last_update = now;
        if inner.state == LinkState::Disconnected {
            inner.state = LinkState::Connected;
            info!("Remote link connected");
        }
    }

    /// Run one supervision step at `now` and notify `handler`.
    ///
    /// Returns the state after the step.
    pub fn poll<H: LinkHandler + ?Sized>(&self, now: Duration, handler: &mut H) -> LinkState {
        let action = {
            let mut inner = self.inner.lock();
            if inner.state == LinkState::Disconnected {
                return LinkState::Disconnected;
            }

            let silence = now.saturating_sub(inner.last_update);
            if silence > self.timeout {
                inner.state = LinkState::Disconnected;
                inner.packet = ControlPacket::ZERO;
                Action::Disconnect { silence }
            } else {
                Action::Control(inner.packet)
            }
        };

        match action {
            Action::Control(packet) => {
                handler.on_control(&packet);
                LinkState::Connected
            }
            Action::Disconnect { silence } => {
                warn!(
                    "Remote link lost: no packet for {}ms (timeout {}ms)",
                    silence.as_millis(),
                    self.timeout.as_millis()
                );
                handler.on_disconnect();
                debug!("Disconnect handler completed");
                LinkState::Disconnected
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> LinkState {
        self.inner.lock().state
    }

    /// Latest stored packet; zero after a disconnect.
    pub fn packet(&self) -> ControlPacket {
        self.inner.lock().packet
    }

    /// Silence window.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
