//! Integration test: settings file to running service, and log relay.

use super::Rig;
use std::io::Write;
use tempfile::NamedTempFile;
use zms_common::bridge::{Instruction, Telemetry};
use zms_common::config::{ConfigError, ConfigLoader};
use zms_common::remote::ControlPacket;
use zms_common::settings::RobotSettings;
use zms_control::link::LinkState;
use zms_control::log_relay::LogQueue;
use zms_control::service::MAX_LOG_LINES_PER_POLL;

fn settings_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_service_from_settings_file() {
    let file = settings_file(
        r#"
[shared]
robot_name = "zms-test"

[link]
timeout_ms = 50

[left_motor]
direction = "cw"
pin_a = 27
pin_b = 21
channel = 0
"#,
    );

    let settings = RobotSettings::load(file.path()).unwrap();
    settings.validate().unwrap();
    assert_eq!(settings.shared.robot_name, "zms-test");

    let mut rig = Rig::new(&settings);
    assert_eq!(
        rig.service.link().timeout(),
        std::time::Duration::from_millis(50)
    );

    rig.host_sends(&[Instruction::SetMotors {
        left: 500,
        right: 0,
    }]);
    rig.step(5);
    // Left motor now turns clockwise: positive command drives pin A high.
    assert_eq!(rig.board.output_level(27), Some(true));
    assert_eq!(rig.board.channel_duty(0), Some(802));

    // Shorter timeout applies to the link.
    let packet = ControlPacket {
        left_x: 0.0,
        left_y: 0.5,
        right_x: 0.0,
        right_y: 0.0,
    };
    rig.demux.handle(&packet.to_bytes());
    rig.step(50);
    assert_eq!(rig.service.link().state(), LinkState::Connected);
    rig.step(5);
    assert_eq!(rig.service.link().state(), LinkState::Disconnected);
}

#[test]
fn test_invalid_settings_are_rejected() {
    let broken = settings_file("[link\ntimeout_ms = 1");
    assert!(matches!(
        RobotSettings::load(broken.path()),
        Err(ConfigError::ParseError(_))
    ));

    let shared_channel = settings_file(
        r#"
[right_motor]
direction = "cw"
pin_a = 19
pin_b = 18
channel = 0
"#,
    );
    let settings = RobotSettings::load(shared_channel.path()).unwrap();
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::ValidationError(_))
    ));

    assert!(matches!(
        RobotSettings::load(std::path::Path::new("/nonexistent/robot.toml")),
        Err(ConfigError::FileNotFound)
    ));
}

#[test]
fn test_queued_logs_reach_the_host() {
    let queue = LogQueue::new(16);
    let mut rig = Rig::new(&RobotSettings::default()).with_log_relay(queue.clone());

    for i in 0..(MAX_LOG_LINES_PER_POLL + 2) {
        queue.push(format!("line {i}"));
    }

    rig.step(5);
    let first = rig.host_receives();
    assert_eq!(first.len(), MAX_LOG_LINES_PER_POLL);
    assert_eq!(first[0], Telemetry::log("line 0"));

    rig.step(5);
    assert_eq!(
        rig.host_receives(),
        vec![Telemetry::log("line 4"), Telemetry::log("line 5")]
    );
    assert!(queue.is_empty());
    assert_eq!(
        rig.service.stats().relayed_logs,
        MAX_LOG_LINES_PER_POLL as u64 + 2
    );
}

#[test]
fn test_replies_precede_relayed_logs() {
    let queue = LogQueue::new(16);
    let mut rig = Rig::new(&RobotSettings::default()).with_log_relay(queue.clone());
    queue.push("hello".to_string());
    rig.host_sends(&[Instruction::GetMillis]);

    rig.step(5);
    let received = rig.host_receives();
    assert_eq!(received.len(), 2);
    assert!(matches!(received[0], Telemetry::Millis(_)));
    assert_eq!(received[1], Telemetry::log("hello"));
}
