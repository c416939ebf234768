//! Periphery integration tests.
//!
//! Builds the full device stack from the default settings document on the
//! simulation board and drives it the way the control service does.

use std::sync::Arc;
use std::time::Duration;
use zms_common::hal::{Board, Clock};
use zms_common::settings::{MotorDriverKind, RobotSettings};
use zms_hal::drivers::simulation::{PinMode, SimulationBoard};
use zms_hal::{BoardRegistry, ManualClock, Periphery};

fn periphery(settings: &RobotSettings) -> (Arc<SimulationBoard>, Arc<ManualClock>, Periphery) {
    let (board, clock) = SimulationBoard::with_manual_clock();
    let periphery = Periphery::new(board.clone(), settings).expect("valid settings");
    periphery.init().expect("init");
    (board, clock, periphery)
}

#[test]
fn test_init_configures_every_pin() {
    let settings = RobotSettings::default();
    let (board, _clock, _periphery) = periphery(&settings);

    for pin in [27, 21, 19, 18, 14, 15] {
        assert_eq!(board.pin_mode(pin), Some(PinMode::Output), "pin {pin}");
    }
    for pin in [32, 33, 25, 26] {
        assert_eq!(board.pin_mode(pin), Some(PinMode::Input), "pin {pin}");
    }
    for pin in [34, 35] {
        assert_eq!(board.pin_mode(pin), Some(PinMode::Analog), "pin {pin}");
    }
    assert!(board.has_interrupt(32));
    assert!(board.has_interrupt(25));

    // Motors stopped, servos released.
    for channel in [0, 1, 14, 15] {
        assert_eq!(board.channel_duty(channel), Some(0), "channel {channel}");
    }
}

#[test]
fn test_motor_directions_follow_wiring() {
    let settings = RobotSettings::default();
    let (board, _clock, periphery) = periphery(&settings);

    // Left motor is mounted mirrored (CCW), so the same forward command
    // drives opposite direction lines.
    periphery.set_motors(0.5, 0.5);
    assert_eq!(board.output_level(27), Some(false));
    assert_eq!(board.output_level(19), Some(true));
    assert_eq!(board.channel_duty(0), Some(802));
    assert_eq!(board.channel_duty(1), Some(802));

    periphery.set_motors(0.005, f32::NAN);
    assert_eq!(board.channel_duty(0), Some(0));
    assert_eq!(board.channel_duty(1), Some(0));
}

#[test]
fn test_encoders_count_independently() {
    let settings = RobotSettings::default();
    let (board, _clock, periphery) = periphery(&settings);

    // Left: rising edges on 32, phase B on 33.
    board.set_input(33, true);
    for _ in 0..5 {
        board.pulse(32);
    }

    // Right: falling edges on 25, phase B on 26 low.
    board.set_input(26, false);
    for _ in 0..3 {
        board.pulse(25);
    }

    assert_eq!(periphery.left_encoder().position(), 5);
    assert_eq!(periphery.right_encoder().position(), -3);
}

#[test]
fn test_distances_read_both_sensors() {
    let settings = RobotSettings::default();
    let (board, clock, periphery) = periphery(&settings);

    board.set_analog(34, 655);
    board.set_analog(35, 0);
    let start = clock.now();
    let (left, right) = periphery.distances();

    assert!((left - 100.05).abs() < 0.01, "{left}");
    assert_eq!(right, f64::INFINITY);
    assert_eq!(clock.now() - start, Duration::from_millis(8));
}

#[test]
fn test_dual_pwm_motors() {
    let mut settings = RobotSettings::default();
    settings.left_motor.kind = MotorDriverKind::DualPwm;
    settings.right_motor.kind = MotorDriverKind::DualPwm;
    let (board, _clock, periphery) = periphery(&settings);

    periphery.set_motors(1.0, -1.0);
    // Left is CCW: positive command activates line B.
    assert_eq!(board.analog_output(27), Some(0));
    assert_eq!(board.analog_output(21), Some(1023));
    // Right is CW: negative command activates line B.
    assert_eq!(board.analog_output(19), Some(0));
    assert_eq!(board.analog_output(18), Some(1023));

    periphery.failsafe();
    for pin in [27, 21, 19, 18] {
        assert_eq!(board.analog_output(pin), Some(0), "pin {pin}");
    }
}

#[test]
fn test_input_only_pin_for_motor_fails_init() {
    let mut settings = RobotSettings::default();
    settings.left_motor.pin_a = 36;
    let (board, _clock) = SimulationBoard::with_manual_clock();
    let periphery = Periphery::new(board, &settings).expect("settings are structurally valid");
    assert!(periphery.init().is_err());
}

#[test]
fn test_registry_board_runs_periphery() {
    let registry = BoardRegistry::with_builtin();
    let board: Arc<dyn Board> = registry.create_board("simulation").expect("builtin");
    assert_eq!(board.name(), "simulation");

    let periphery = Periphery::new(board, &RobotSettings::default()).expect("valid");
    periphery.init().expect("init");
    periphery.failsafe();
}
