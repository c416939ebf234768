//! Actuator mapping benchmarks.
//!
//! Covers the per-cycle work of the drive path: two motor mappings plus a
//! servo angle, and the interrupt-side cost of one encoder edge.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use zms_common::settings::{
    ConversionSettings, Direction, EncoderPins, ManipulatorSettings, MotorPwmSettings,
};
use zms_hal::devices::QuadratureCounter;
use zms_hal::{MotorMapper, ServoMapper, SimulationBoard};

fn bench_motor_mapping(c: &mut Criterion) {
    let mapper = MotorMapper::new(&MotorPwmSettings::default(), Direction::Cw).expect("valid");

    c.bench_function("motor_from_normalized", |b| {
        let mut v = -1.0f32;
        b.iter(|| {
            v = if v >= 1.0 { -1.0 } else { v + 0.001 };
            black_box(mapper.drive(mapper.from_normalized(black_box(v))));
        });
    });
}

fn bench_servo_mapping(c: &mut Criterion) {
    let settings = ManipulatorSettings::default();
    let mapper = ServoMapper::new(&settings.driver, &settings.arm).expect("valid");

    c.bench_function("servo_duty_from_angle", |b| {
        let mut angle = 0;
        b.iter(|| {
            angle = (angle + 1) % 181;
            black_box(mapper.duty_from_angle(black_box(angle)));
        });
    });
}

fn bench_encoder_edge(c: &mut Criterion) {
    let (board, _clock) = SimulationBoard::with_manual_clock();
    let pins = EncoderPins {
        phase_a: 32,
        phase_b: 33,
        edge: Default::default(),
    };
    let counter =
        QuadratureCounter::new(board.clone(), pins, ConversionSettings::default()).expect("valid");
    counter.init().expect("init");
    board.set_input(33, true);

    c.bench_function("encoder_edge", |b| {
        b.iter(|| board.pulse(black_box(32)));
    });
    black_box(counter.position());
}

criterion_group!(
    benches,
    bench_motor_mapping,
    bench_servo_mapping,
    bench_encoder_edge
);
criterion_main!(benches);
