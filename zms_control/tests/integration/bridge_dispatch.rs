//! Integration test: host bridge instructions drive the periphery and
//! replies come back on the same stream.

use super::Rig;
use std::time::Duration;
use zms_common::bridge::{AxisCommand, BridgeError, Instruction, Telemetry};
use zms_common::settings::RobotSettings;

#[test]
fn test_set_motors_scales_to_pwm() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.host_sends(&[Instruction::SetMotors {
        left: 500,
        right: -500,
    }]);
    rig.step(5);

    // Left motor is CCW, right is CW: opposite signs land on the same line level.
    assert_eq!(rig.board.channel_duty(0), Some(802));
    assert_eq!(rig.board.channel_duty(1), Some(802));
    assert_eq!(rig.board.output_level(27), Some(false));
    assert_eq!(rig.board.output_level(19), Some(false));
    assert!(rig.host_receives().is_empty());
}

#[test]
fn test_out_of_range_motor_command_is_clamped() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.host_sends(&[Instruction::SetMotors {
        left: i16::MAX,
        right: i16::MIN,
    }]);
    rig.step(5);
    assert_eq!(rig.board.channel_duty(0), Some(1023));
    assert_eq!(rig.board.channel_duty(1), Some(1023));
}

#[test]
fn test_get_millis_replies_with_uptime() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.clock.set(Duration::from_millis(1229));
    rig.host_sends(&[Instruction::GetMillis]);
    rig.step(5);

    assert_eq!(rig.host_receives(), vec![Telemetry::Millis(1234)]);
}

#[test]
fn test_get_distances_replies_with_both_sensors() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.board.set_analog(34, 655);
    rig.board.set_analog(35, 0);
    rig.host_sends(&[Instruction::GetDistances]);
    rig.step(5);

    assert_eq!(
        rig.host_receives(),
        vec![Telemetry::Distances {
            left: 100,
            right: u16::MAX
        }]
    );
}

#[test]
fn test_set_manipulator_with_disable_code() {
    let mut rig = Rig::new(&RobotSettings::default());
    let (arm, claw) = (14, 15);

    rig.host_sends(&[Instruction::SetManipulator {
        arm: AxisCommand::Angle(180),
        claw: AxisCommand::Angle(0),
    }]);
    rig.step(5);
    assert_eq!(rig.board.channel_duty(arm), Some(122));
    assert_eq!(rig.board.channel_duty(claw), Some(25));

    // Raw wire form: opcode 0x01, arm 0xFF (disable), claw 90.
    rig.host_sends_raw(&[0x01, 0xFF, 90]);
    rig.step(5);
    assert_eq!(rig.board.channel_duty(arm), Some(0));
    assert_eq!(rig.board.channel_duty(claw), Some(74));
}

#[test]
fn test_one_instruction_per_poll() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.host_sends(&[
        Instruction::GetMillis,
        Instruction::GetMillis,
        Instruction::GetMillis,
    ]);

    rig.step(5);
    assert_eq!(rig.host_receives().len(), 1);
    rig.step(5);
    rig.step(5);
    assert_eq!(rig.host_receives().len(), 2);
    assert_eq!(rig.service.stats().instructions, 3);
}

#[test]
fn test_unknown_opcode_keeps_stream_usable() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.host_sends_raw(&[0x7E]);
    rig.host_sends(&[Instruction::SetMotors {
        left: 1000,
        right: 1000,
    }]);

    rig.step(5);
    assert_eq!(
        rig.service.bridge().stats().last_error,
        Some(BridgeError::UnknownOpcode(0x7E))
    );
    assert_eq!(rig.board.channel_duty(0), Some(0));

    rig.step(5);
    assert_eq!(rig.board.channel_duty(0), Some(1023));
    assert_eq!(rig.service.bridge().stats().received, 1);
    assert_eq!(rig.service.bridge().stats().dropped, 1);
}

#[test]
fn test_truncated_manipulator_is_dropped() {
    let mut rig = Rig::new(&RobotSettings::default());
    rig.host_sends_raw(&[0x01, 90]);
    rig.step(5);
    assert_eq!(
        rig.service.bridge().stats().last_error,
        Some(BridgeError::ArgumentReadFail(0x01))
    );
    assert_eq!(rig.board.channel_duty(14), Some(0));

    rig.host_sends(&[Instruction::GetMillis]);
    rig.step(5);
    assert_eq!(rig.host_receives().len(), 1);
}
