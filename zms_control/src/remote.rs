//! Remote datagram demultiplexer.

use crate::link::LinkSupervisor;
use std::sync::Arc;
use tracing::{debug, warn};
use zms_common::hal::Clock;
use zms_common::remote::{Inbound, UiEvent};

/// Routes remote datagrams by size: control packets to the link
/// supervisor, menu events to the log, anything else is reported.
///
/// `clock` must be the one the service polls the link with.
pub struct RemoteDemux<C: Clock + ?Sized = dyn Clock> {
    link: Arc<LinkSupervisor>,
    clock: Arc<C>,
}

impl<C: Clock + ?Sized> Clone for RemoteDemux<C> {
    fn clone(&self) -> Self {
        Self {
            link: self.link.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<C: Clock + ?Sized> RemoteDemux<C> {
    /// Demultiplexer stamping packets with `clock`.
    pub fn new(link: Arc<LinkSupervisor>, clock: Arc<C>) -> Self {
        Self { link, clock }
    }

    /// Handle one whole datagram. Returns what it was classified as.
    pub fn handle(&self, datagram: &[u8]) -> Inbound {
        let inbound = Inbound::classify(datagram);
        match inbound {
            Inbound::Control(packet) => {
                self.link.update_control_packet(packet, self.clock.now());
            }
            Inbound::Ui(UiEvent::None) => {
                debug!("UI event with unknown code 0x{:02X}", datagram[0]);
            }
            Inbound::Ui(event) => {
                // No menu on this robot.
                debug!("UI event {:?}", event);
            }
            Inbound::Unknown(len) => {
                warn!("Unknown packet: ({} bytes)", len);
            }
        }
        inbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkState;
    use std::time::Duration;
    use zms_common::remote::ControlPacket;
    use zms_hal::ManualClock;

    fn demux() -> (RemoteDemux<ManualClock>, Arc<LinkSupervisor>, Arc<ManualClock>) {
        let link = Arc::new(LinkSupervisor::new(Duration::from_millis(200)));
        let clock = Arc::new(ManualClock::new());
        (RemoteDemux::new(link.clone(), clock.clone()), link, clock)
    }

    #[test]
    fn control_packet_connects_link() {
        let (demux, link, clock) = demux();
        clock.set(Duration::from_millis(42));
        let packet = ControlPacket {
            left_x: 0.25,
            left_y: -1.0,
            right_x: 0.0,
            right_y: 1.0,
        };

        assert_eq!(demux.handle(&packet.to_bytes()), Inbound::Control(packet));
        assert_eq!(link.state(), LinkState::Connected);
        assert_eq!(link.packet(), packet);
    }

    #[test]
    fn other_sizes_leave_link_alone() {
        let (demux, link, _clock) = demux();
        assert_eq!(demux.handle(&[0x20]), Inbound::Ui(UiEvent::Click));
        assert_eq!(demux.handle(&[0x99]), Inbound::Ui(UiEvent::None));
        assert_eq!(demux.handle(&[0u8; 7]), Inbound::Unknown(7));
        assert_eq!(demux.handle(&[]), Inbound::Unknown(0));
        assert_eq!(link.state(), LinkState::Disconnected);
    }
}
