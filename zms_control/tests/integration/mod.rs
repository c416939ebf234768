//! Shared rig for the integration tests.

mod bridge_dispatch;
mod link_failsafe;
mod startup;

use std::sync::Arc;
use std::time::Duration;
use zms_common::bridge::{Instruction, MemoryStream, Sender, Telemetry, receive};
use zms_common::settings::RobotSettings;
use zms_control::link::LinkSupervisor;
use zms_control::log_relay::LogQueue;
use zms_control::remote::RemoteDemux;
use zms_control::service::Service;
use zms_hal::{ManualClock, Periphery, SimulationBoard};

/// Service on a simulation board with a manual clock and an in-memory bridge.
pub struct Rig {
    pub board: Arc<SimulationBoard>,
    pub clock: Arc<ManualClock>,
    pub demux: RemoteDemux<ManualClock>,
    pub service: Service<MemoryStream>,
}

impl Rig {
    pub fn new(settings: &RobotSettings) -> Self {
        let (board, clock) = SimulationBoard::with_manual_clock();
        let periphery = Periphery::new(board.clone(), settings).expect("valid settings");
        periphery.init().expect("init");

        let link = Arc::new(LinkSupervisor::from_settings(&settings.link));
        let demux = RemoteDemux::new(link.clone(), clock.clone());
        let service = Service::new(periphery, link, MemoryStream::new());

        Self {
            board,
            clock,
            demux,
            service,
        }
    }

    /// Relay lines from `queue` to the host.
    pub fn with_log_relay(self, queue: LogQueue) -> Self {
        Self {
            service: self.service.with_log_relay(queue),
            ..self
        }
    }

    /// Queue host instructions on the bridge.
    pub fn host_sends(&mut self, instructions: &[Instruction]) {
        let mut wire = MemoryStream::new();
        for instruction in instructions {
            Sender::new(&mut wire)
                .send(instruction)
                .expect("encode");
        }
        let bytes = wire.take_output();
        self.service.bridge_mut().stream_mut().feed(&bytes);
    }

    /// Queue raw bytes on the bridge.
    pub fn host_sends_raw(&mut self, bytes: &[u8]) {
        self.service.bridge_mut().stream_mut().feed(bytes);
    }

    /// Decode everything the robot sent so far.
    pub fn host_receives(&mut self) -> Vec<Telemetry> {
        let mut wire = MemoryStream::new();
        wire.feed(&self.service.bridge_mut().stream_mut().take_output());
        let mut out = Vec::new();
        while let Some(result) = receive::<Telemetry, _>(&mut wire) {
            out.push(result.expect("valid telemetry"));
        }
        out
    }

    /// Advance the clock by `ms` and poll once.
    pub fn step(&mut self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
        self.service.poll();
    }
}

