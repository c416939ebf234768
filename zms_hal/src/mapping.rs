//! Pure conversions from commands to PWM values.
//!
//! - [`MotorMapper`]: normalized command `[-1, 1]` to signed PWM with a
//!   near-zero input dead zone and the motor's output dead zone offset.
//! - [`ServoMapper`]: angle to pulse width (two-point map) to PWM duty.
//!
//! Both are built from validated settings and have no error path afterwards.

use zms_common::config::ConfigError;
use zms_common::consts::NORMALIZED_DEAD_ZONE;
use zms_common::settings::{
    AxisSettings, Degrees, Direction, Microseconds, MotorPwmSettings, PulseSettings,
    ServoDriverSettings, SignedPwm,
};

/// Resolved output of one motor write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorDrive {
    /// `true` when line A is the active line.
    pub line_a_active: bool,
    /// Duty on the active line.
    pub duty: u32,
}

/// Normalized command to signed PWM conversion for one motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorMapper {
    max_pwm: SignedPwm,
    dead_zone: SignedPwm,
    direction: Direction,
}

impl MotorMapper {
    /// Build a mapper from validated PWM settings.
    pub fn new(pwm: &MotorPwmSettings, direction: Direction) -> Result<Self, ConfigError> {
        pwm.validate()?;
        Ok(Self {
            max_pwm: pwm.max_pwm(),
            dead_zone: pwm.dead_zone,
            direction,
        })
    }

    /// Largest PWM magnitude this mapper produces.
    #[inline]
    pub fn max_pwm(&self) -> SignedPwm {
        self.max_pwm
    }

    /// Map a normalized command to signed PWM.
    ///
    /// NaN and magnitudes below `NORMALIZED_DEAD_ZONE` yield 0. Otherwise the
    /// result is `round(|v| * (max_pwm - dead_zone)) + dead_zone` with the
    /// sign of `v`, `v` being clamped to `[-1, 1]` first.
    pub fn from_normalized(&self, value: f32) -> SignedPwm {
        if value.is_nan() {
            return 0;
        }

        let magnitude = value.clamp(-1.0, 1.0).abs();
        if magnitude < NORMALIZED_DEAD_ZONE {
            return 0;
        }

        let span = f32::from(self.max_pwm - self.dead_zone);
        let pwm = (magnitude * span).round() as SignedPwm + self.dead_zone;

        if value > 0.0 { pwm } else { -pwm }
    }

    /// Clamp to `[-max_pwm, max_pwm]`.
    #[inline]
    pub fn clamp(&self, pwm: SignedPwm) -> SignedPwm {
        pwm.clamp(-self.max_pwm, self.max_pwm)
    }

    /// Whether `pwm` drives line A for the configured direction.
    ///
    /// Positive PWM selects line A for `Cw` motors and line B for `Ccw`
    /// motors; zero behaves as negative.
    #[inline]
    pub fn match_direction(&self, pwm: SignedPwm) -> bool {
        (self.direction == Direction::Cw) == (pwm > 0)
    }

    /// Clamp `pwm` and resolve it to an active line and a duty.
    pub fn drive(&self, pwm: SignedPwm) -> MotorDrive {
        let pwm = self.clamp(pwm);
        MotorDrive {
            line_a_active: self.match_direction(pwm),
            duty: u32::from(pwm.unsigned_abs()),
        }
    }
}

/// Angle to PWM duty conversion for one servo axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoMapper {
    pulse: PulseSettings,
    min_angle: Degrees,
    max_angle: Degrees,
    frequency_hz: u32,
    max_duty: u32,
}

impl ServoMapper {
    /// Build a mapper, validating the driver settings and the axis range
    /// against the pulse map.
    pub fn new(driver: &ServoDriverSettings, axis: &AxisSettings) -> Result<Self, ConfigError> {
        driver.validate()?;
        axis.validate(&driver.pulse)?;
        Ok(Self {
            pulse: driver.pulse,
            min_angle: axis.min_angle,
            max_angle: axis.max_angle,
            frequency_hz: driver.pwm.frequency_hz,
            max_duty: driver.pwm.max_duty(),
        })
    }

    /// Largest duty this mapper produces.
    #[inline]
    pub fn max_duty(&self) -> u32 {
        self.max_duty
    }

    /// Clamp to the axis range.
    #[inline]
    pub fn clamp_angle(&self, angle: Degrees) -> Degrees {
        angle.clamp(self.min_angle, self.max_angle)
    }

    /// Pulse width for `angle`, clamped to the axis range and linearly
    /// interpolated between the pulse map endpoints (integer arithmetic).
    pub fn pulse_width(&self, angle: Degrees) -> Microseconds {
        let angle = i64::from(self.clamp_angle(angle));
        let (a0, a1) = (i64::from(self.pulse.min.angle), i64::from(self.pulse.max.angle));
        let (p0, p1) = (
            i64::from(self.pulse.min.pulse_us),
            i64::from(self.pulse.max.pulse_us),
        );

        let pulse = (angle - a0) * (p1 - p0) / (a1 - a0) + p0;
        pulse.clamp(p0, p1) as Microseconds
    }

    /// `pulse_us * frequency_hz * max_duty / 1_000_000`, truncated and
    /// capped at `max_duty`.
    pub fn duty_from_pulse(&self, pulse_us: Microseconds) -> u32 {
        let duty = u64::from(pulse_us) * u64::from(self.frequency_hz) * u64::from(self.max_duty)
            / 1_000_000;
        duty.min(u64::from(self.max_duty)) as u32
    }

    /// Duty for `angle`.
    #[inline]
    pub fn duty_from_angle(&self, angle: Degrees) -> u32 {
        self.duty_from_pulse(self.pulse_width(angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use zms_common::settings::{ManipulatorSettings, PulsePoint, ServoPwmSettings};

    fn motor(direction: Direction) -> MotorMapper {
        MotorMapper::new(&MotorPwmSettings::default(), direction).unwrap()
    }

    fn servo(min_angle: Degrees, max_angle: Degrees) -> ServoMapper {
        let axis = AxisSettings {
            min_angle,
            max_angle,
            ..ManipulatorSettings::default().arm
        };
        ServoMapper::new(&ServoDriverSettings::default(), &axis).unwrap()
    }

    #[test]
    fn motor_mapper_rejects_invalid_pwm() {
        let pwm = MotorPwmSettings {
            resolution_bits: 16,
            ..Default::default()
        };
        assert!(MotorMapper::new(&pwm, Direction::Cw).is_err());
    }

    #[test]
    fn normalized_zero_band_and_nan() {
        let mapper = motor(Direction::Cw);
        assert_eq!(mapper.from_normalized(f32::NAN), 0);
        assert_eq!(mapper.from_normalized(0.0), 0);
        assert_eq!(mapper.from_normalized(0.0099), 0);
        assert_eq!(mapper.from_normalized(-0.0099), 0);
        assert_ne!(mapper.from_normalized(0.01), 0);
    }

    #[test]
    fn normalized_full_scale_and_dead_zone_offset() {
        // max_pwm 1023, dead_zone 580
        let mapper = motor(Direction::Cw);
        assert_eq!(mapper.from_normalized(1.0), 1023);
        assert_eq!(mapper.from_normalized(-1.0), -1023);
        assert_eq!(mapper.from_normalized(5.0), 1023);
        assert_eq!(mapper.from_normalized(f32::NEG_INFINITY), -1023);
        assert_eq!(mapper.from_normalized(0.01), 584);
        // 0.5 * 443 = 221.5 rounds to 222
        assert_eq!(mapper.from_normalized(0.5), 802);
        assert_eq!(mapper.from_normalized(-0.5), -802);
    }

    #[test]
    fn drive_clamps_and_selects_line() {
        let cw = motor(Direction::Cw);
        assert_eq!(
            cw.drive(2000),
            MotorDrive {
                line_a_active: true,
                duty: 1023
            }
        );
        assert_eq!(
            cw.drive(-300),
            MotorDrive {
                line_a_active: false,
                duty: 300
            }
        );
        assert_eq!(cw.drive(i16::MIN).duty, 1023);

        let ccw = motor(Direction::Ccw);
        assert!(!ccw.drive(300).line_a_active);
        assert!(ccw.drive(-300).line_a_active);
    }

    #[test]
    fn stop_drives_zero_duty() {
        for direction in [Direction::Cw, Direction::Ccw] {
            assert_eq!(motor(direction).drive(0).duty, 0);
        }
    }

    #[test]
    fn servo_default_map_endpoints() {
        let mapper = servo(0, 180);
        assert_eq!(mapper.pulse_width(0), 500);
        assert_eq!(mapper.pulse_width(180), 2400);
        assert_eq!(mapper.pulse_width(90), 1450);
        // 500 us at 50 Hz with 10 bits: 500 * 50 * 1023 / 1e6 = 25.575
        assert_eq!(mapper.duty_from_angle(0), 25);
        // 2400 * 50 * 1023 / 1e6 = 122.76
        assert_eq!(mapper.duty_from_angle(180), 122);
    }

    #[test]
    fn servo_clamps_to_axis_range() {
        let mapper = servo(45, 135);
        assert_eq!(mapper.clamp_angle(-20), 45);
        assert_eq!(mapper.clamp_angle(500), 135);
        assert_eq!(mapper.pulse_width(0), mapper.pulse_width(45));
        assert_eq!(mapper.pulse_width(180), mapper.pulse_width(135));
    }

    #[test]
    fn servo_mapper_rejects_axis_outside_pulse_map() {
        let axis = AxisSettings {
            max_angle: 200,
            ..ManipulatorSettings::default().arm
        };
        assert!(ServoMapper::new(&ServoDriverSettings::default(), &axis).is_err());
    }

    #[test]
    fn duty_is_capped_at_max_duty() {
        let driver = ServoDriverSettings {
            pwm: ServoPwmSettings {
                frequency_hz: 1_000,
                resolution_bits: 8,
            },
            pulse: PulseSettings {
                min: PulsePoint {
                    pulse_us: 500,
                    angle: 0,
                },
                max: PulsePoint {
                    pulse_us: 2400,
                    angle: 180,
                },
            },
        };
        let mapper = ServoMapper::new(&driver, &ManipulatorSettings::default().arm).unwrap();
        assert_eq!(mapper.duty_from_angle(180), 255);
    }

    proptest! {
        #[test]
        fn normalized_output_is_bounded(value in -1.0f32..=1.0) {
            let mapper = motor(Direction::Cw);
            let pwm = mapper.from_normalized(value);
            prop_assert!(pwm.abs() <= mapper.max_pwm());
            prop_assert_eq!(pwm == 0, value.abs() < NORMALIZED_DEAD_ZONE);
        }

        #[test]
        fn normalized_output_is_odd(value in -1.0f32..=1.0) {
            let mapper = motor(Direction::Ccw);
            prop_assert_eq!(mapper.from_normalized(-value), -mapper.from_normalized(value));
        }

        #[test]
        fn direction_setting_flips_active_line(pwm in 1i16..=1023) {
            let cw = motor(Direction::Cw);
            let ccw = motor(Direction::Ccw);
            prop_assert_ne!(cw.drive(pwm).line_a_active, ccw.drive(pwm).line_a_active);
            prop_assert_ne!(cw.drive(-pwm).line_a_active, ccw.drive(-pwm).line_a_active);
            prop_assert_ne!(cw.drive(pwm).line_a_active, cw.drive(-pwm).line_a_active);
        }

        #[test]
        fn servo_duty_is_monotone_and_bounded(a in 0i32..=180, b in 0i32..=180) {
            let mapper = servo(0, 180);
            let (lo, hi) = (a.min(b), a.max(b));
            prop_assert!(mapper.duty_from_angle(lo) <= mapper.duty_from_angle(hi));
            prop_assert!(mapper.duty_from_angle(hi) <= mapper.max_duty());
        }
    }
}
