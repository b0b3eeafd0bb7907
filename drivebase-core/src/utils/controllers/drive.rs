//! Mecanum drivetrain capability.
//!
//! `MecanumDrivetrain` forwards four per-corner power requests to four
//! `MotorActuator`s. Values pass through untouched: range checks, if any,
//! belong to the actuator driver.

use serde::{Deserialize, Serialize};

/// Lateral distance between the wheel contact points of the chassis.
pub const WHEELBASE_WIDTH: f64 = 14.544475;

/// Four-wheel power control for a mecanum chassis.
pub trait MecanumDrive {
    type Error: core::fmt::Debug;

    /// Command all four wheels. Each value is applied immediately.
    fn set_motor_powers(
        &mut self,
        front_left: f32,
        back_left: f32,
        front_right: f32,
        back_right: f32,
    ) -> Result<(), Self::Error>;

    /// Wheelbase width used by upstream kinematics.
    fn wheelbase_width(&self) -> f64;
}

/// A single motor that accepts a signed power command.
pub trait MotorActuator {
    type Error: core::fmt::Debug;

    /// Apply `power` (nominally in [-1.0, 1.0], negative = reverse).
    fn set_power(
        &mut self,
        power: f32,
    ) -> Result<(), Self::Error>;
}

/// Drivetrain corners, in command order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wheel {
    FrontLeft,
    BackLeft,
    FrontRight,
    BackRight,
}

impl Wheel {
    pub const ALL: [Wheel; 4] = [
        Wheel::FrontLeft,
        Wheel::BackLeft,
        Wheel::FrontRight,
        Wheel::BackRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One power value per corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorPowers {
    pub front_left: f32,
    pub back_left: f32,
    pub front_right: f32,
    pub back_right: f32,
}

impl MotorPowers {
    pub const STOP: MotorPowers = MotorPowers::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(
        front_left: f32,
        back_left: f32,
        front_right: f32,
        back_right: f32,
    ) -> Self {
        Self {
            front_left,
            back_left,
            front_right,
            back_right,
        }
    }

    /// Powers as `[front_left, back_left, front_right, back_right]`.
    pub fn as_array(&self) -> [f32; 4] {
        [
            self.front_left,
            self.back_left,
            self.front_right,
            self.back_right,
        ]
    }

    pub fn get(
        &self,
        wheel: Wheel,
    ) -> f32 {
        self.as_array()[wheel.index()]
    }

    /// Whether every value is finite and within [-1.0, 1.0].
    pub fn is_within_limits(&self) -> bool {
        self.as_array()
            .iter()
            .all(|p| p.is_finite() && (-1.0..=1.0).contains(p))
    }
}

/// Mecanum drivetrain over four independently powered motors.
pub struct MecanumDrivetrain<M> {
    motors: [M; 4],
}

impl<M> MecanumDrivetrain<M> {
    pub fn new(
        front_left: M,
        back_left: M,
        front_right: M,
        back_right: M,
    ) -> Self {
        Self {
            motors: [front_left, back_left, front_right, back_right],
        }
    }

    pub fn motor(
        &self,
        wheel: Wheel,
    ) -> &M {
        &self.motors[wheel.index()]
    }

    pub fn motor_mut(
        &mut self,
        wheel: Wheel,
    ) -> &mut M {
        &mut self.motors[wheel.index()]
    }

    pub fn into_motors(self) -> [M; 4] {
        self.motors
    }
}

impl<M: MotorActuator> MecanumDrivetrain<M> {
    /// Apply a full set of powers.
    pub fn apply(
        &mut self,
        powers: &MotorPowers,
    ) -> Result<(), M::Error> {
        self.set_motor_powers(
            powers.front_left,
            powers.back_left,
            powers.front_right,
            powers.back_right,
        )
    }

    /// Command zero power on every wheel.
    pub fn stop(&mut self) -> Result<(), M::Error> {
        self.apply(&MotorPowers::STOP)
    }
}

impl<M: MotorActuator> MecanumDrive for MecanumDrivetrain<M> {
    type Error = M::Error;

    fn set_motor_powers(
        &mut self,
        front_left: f32,
        back_left: f32,
        front_right: f32,
        back_right: f32,
    ) -> Result<(), Self::Error> {
        let powers = [front_left, back_left, front_right, back_right];
        for (motor, &power) in self.motors.iter_mut().zip(powers.iter()) {
            motor.set_power(power)?;
        }
        Ok(())
    }

    fn wheelbase_width(&self) -> f64 {
        WHEELBASE_WIDTH
    }
}
