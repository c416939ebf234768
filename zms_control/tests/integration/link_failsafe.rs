//! Integration test: remote joystick link drives the robot and the
//! failsafe fires once when the link goes silent.

use super::Rig;
use zms_common::remote::{ControlPacket, Inbound};
use zms_common::settings::RobotSettings;
use zms_control::link::LinkState;

fn forward_with_arm_up() -> ControlPacket {
    ControlPacket {
        left_x: 0.0,
        left_y: 1.0,
        right_x: 0.0,
        right_y: 1.0,
    }
}

#[test]
fn test_joystick_drives_while_connected() {
    let mut rig = Rig::new(&RobotSettings::default());
    assert!(matches!(
        rig.demux.handle(&forward_with_arm_up().to_bytes()),
        Inbound::Control(_)
    ));

    rig.step(5);
    assert_eq!(rig.service.link().state(), LinkState::Connected);
    assert_eq!(rig.board.channel_duty(0), Some(1023));
    assert_eq!(rig.board.channel_duty(1), Some(1023));
    // Claw centered at 90 degrees, arm at 180.
    assert_eq!(rig.board.channel_duty(15), Some(74));
    assert_eq!(rig.board.channel_duty(14), Some(122));
}

#[test]
fn test_control_reapplied_every_poll() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.demux.handle(&forward_with_arm_up().to_bytes());
    rig.step(5);

    // Something else overwrites the outputs; the next poll restores them.
    rig.service.periphery().stop_motors();
    assert_eq!(rig.board.channel_duty(0), Some(0));
    rig.step(5);
    assert_eq!(rig.board.channel_duty(0), Some(1023));
}

#[test]
fn test_silence_triggers_failsafe_once() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.demux.handle(&forward_with_arm_up().to_bytes());
    rig.step(5);

    // 200 ms timeout: still connected at exactly 200 ms of silence.
    for _ in 0..39 {
        rig.step(5);
    }
    assert_eq!(rig.service.link().state(), LinkState::Connected);

    rig.step(5);
    assert_eq!(rig.service.link().state(), LinkState::Disconnected);
    assert_eq!(rig.service.link().packet(), ControlPacket::ZERO);
    for channel in [0, 1, 14, 15] {
        assert_eq!(rig.board.channel_duty(channel), Some(0), "channel {channel}");
    }

    // Failsafe does not repeat: bridge commands stick while disconnected.
    rig.service.periphery().manipulator().set_arm(90);
    for _ in 0..20 {
        rig.step(5);
    }
    assert_ne!(rig.board.channel_duty(14), Some(0));
}

#[test]
fn test_steady_packets_never_disconnect() {
    let mut rig = Rig::new(&RobotSettings::default());
    for _ in 0..200 {
        rig.demux.handle(&forward_with_arm_up().to_bytes());
        rig.step(50);
        assert_eq!(rig.service.link().state(), LinkState::Connected);
    }
}

#[test]
fn test_reconnect_after_loss() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.demux.handle(&forward_with_arm_up().to_bytes());
    rig.step(500);
    assert_eq!(rig.service.link().state(), LinkState::Disconnected);

    rig.demux.handle(&forward_with_arm_up().to_bytes());
    rig.step(5);
    assert_eq!(rig.service.link().state(), LinkState::Connected);
    assert_eq!(rig.board.channel_duty(0), Some(1023));
}

#[test]
fn test_ui_and_garbage_datagrams_do_not_connect() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.demux.handle(&[0x10]);
    rig.demux.handle(&[1, 2, 3]);
    rig.step(5);
    assert_eq!(rig.service.link().state(), LinkState::Disconnected);
}
