//! Robot service: one poll step of the whole control core.
//!
//! Each [`Service::poll`] runs, in order:
//!
//! 1. **Bridge** - decode at most one host instruction and execute it
//! 2. **Link** - supervise the remote link; while connected the latest
//!    joystick packet drives the robot, on loss the failsafe runs once
//! 3. **Log relay** - forward a few queued log lines as `Log` telemetry

use crate::link::{LinkHandler, LinkState, LinkSupervisor};
use crate::log_relay::{LogQueue, RELAY_TARGET};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use zms_common::bridge::{
    AxisCommand, BridgeChannel, InputStream, Instruction, OutputStream, Telemetry,
    normalize_motor_command,
};
use zms_common::hal::Clock;
use zms_common::remote::ControlPacket;
use zms_common::settings::Degrees;
use zms_hal::Periphery;

/// Log lines relayed per poll.
pub const MAX_LOG_LINES_PER_POLL: usize = 4;

/// Differential mix of the left stick: `(left, right)` motor commands.
#[inline]
pub fn drive_mix(packet: &ControlPacket) -> (f32, f32) {
    (
        packet.left_y + packet.left_x,
        packet.left_y - packet.left_x,
    )
}

/// Claw angle from the right stick's horizontal axis: `[-1, 1]` to `[0, 180]`.
#[inline]
pub fn claw_angle(packet: &ControlPacket) -> Degrees {
    (packet.right_x * 90.0 + 90.0) as Degrees
}

/// Arm angle from the right stick's vertical axis: `[-1, 1]` to `[90, 180]`.
#[inline]
pub fn arm_angle(packet: &ControlPacket) -> Degrees {
    (packet.right_y * 45.0 + 135.0) as Degrees
}

/// Link reactions acting on the periphery.
struct DriveHandler<'a> {
    periphery: &'a Periphery,
}

impl LinkHandler for DriveHandler<'_> {
    fn on_control(&mut self, packet: &ControlPacket) {
        let (left, right) = drive_mix(packet);
        self.periphery.set_motors(left, right);

        let manipulator = self.periphery.manipulator();
        manipulator.set_claw(claw_angle(packet));
        manipulator.set_arm(arm_angle(packet));
    }

    fn on_disconnect(&mut self) {
        self.periphery.failsafe();
    }
}

fn apply_axis(command: AxisCommand, set: impl FnOnce(Degrees), disable: impl FnOnce()) {
    match command {
        AxisCommand::Angle(angle) => set(Degrees::from(angle)),
        AxisCommand::Disable => disable(),
    }
}

/// Counters kept by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Instructions executed.
    pub instructions: u64,
    /// Replies that could not be sent.
    pub reply_failures: u64,
    /// Log lines relayed.
    pub relayed_logs: u64,
}

/// The control core: periphery, remote link and host bridge.
pub struct Service<S> {
    periphery: Periphery,
    link: Arc<LinkSupervisor>,
    bridge: BridgeChannel<S>,
    log_queue: Option<LogQueue>,
    stats: ServiceStats,
}

impl<S: InputStream + OutputStream> Service<S> {
    /// Compose a service. `periphery` must already be initialized.
    pub fn new(periphery: Periphery, link: Arc<LinkSupervisor>, stream: S) -> Self {
        Self {
            periphery,
            link,
            bridge: BridgeChannel::new(stream),
            log_queue: None,
            stats: ServiceStats::default(),
        }
    }

    /// Relay lines from `queue` to the host.
    pub fn with_log_relay(mut self, queue: LogQueue) -> Self {
        self.log_queue = Some(queue);
        self
    }

    /// One poll step. Returns the link state after supervision.
    pub fn poll(&mut self) -> LinkState {
        self.poll_bridge();

        let now = self.periphery.board().now();
        let state = self.link.poll(
            now,
            &mut DriveHandler {
                periphery: &self.periphery,
            },
        );

        self.relay_logs();
        state
    }

    fn poll_bridge(&mut self) {
        match self.bridge.poll::<Instruction>() {
            None => {}
            Some(Ok(instruction)) => self.execute(instruction),
            Some(Err(e)) => warn!("Bridge message dropped: {}", e),
        }
    }

    /// Execute one host instruction, replying where the instruction asks for it.
    pub fn execute(&mut self, instruction: Instruction) {
        debug!("Executing {:?}", instruction);
        self.stats.instructions += 1;

        let reply = match instruction {
            Instruction::GetMillis => Some(Telemetry::Millis(self.periphery.board().millis())),
            Instruction::SetManipulator { arm, claw } => {
                let manipulator = self.periphery.manipulator();
                apply_axis(
                    arm,
                    |a| manipulator.set_arm(a),
                    || manipulator.disable_arm(),
                );
                apply_axis(
                    claw,
                    |a| manipulator.set_claw(a),
                    || manipulator.disable_claw(),
                );
                None
            }
            Instruction::GetDistances => {
                let (left, right) = self.periphery.distances();
                Some(Telemetry::distances(left, right))
            }
            Instruction::SetMotors { left, right } => {
                self.periphery.set_motors(
                    normalize_motor_command(left),
                    normalize_motor_command(right),
                );
                None
            }
        };

        if let Some(reply) = reply {
            if let Err(e) = self.bridge.send(&reply) {
                self.stats.reply_failures += 1;
                warn!("Bridge reply dropped: {}", e);
            }
        }
    }

    fn relay_logs(&mut self) {
        let Some(queue) = &self.log_queue else {
            return;
        };
        for line in queue.drain(MAX_LOG_LINES_PER_POLL) {
            if let Err(e) = self.bridge.send(&Telemetry::log(&line)) {
                trace!(target: RELAY_TARGET, "Log relay paused: {}", e);
                break;
            }
            self.stats.relayed_logs += 1;
        }
    }

    /// Drive every actuator to the safe state.
    pub fn shutdown(&self) {
        info!("Service shutting down");
        self.periphery.failsafe();
    }

    /// Devices.
    pub fn periphery(&self) -> &Periphery {
        &self.periphery
    }

    /// Remote link supervisor.
    pub fn link(&self) -> &Arc<LinkSupervisor> {
        &self.link
    }

    /// Host bridge.
    pub fn bridge(&self) -> &BridgeChannel<S> {
        &self.bridge
    }

    /// Host bridge, mutably.
    pub fn bridge_mut(&mut self) -> &mut BridgeChannel<S> {
        &mut self.bridge
    }

    /// Counters.
    pub fn stats(&self) -> ServiceStats {
        self.stats
    }
}
