//! Planar angle values returned by heading sensors.
//!
//! An `Angle` is an immutable measurement: a magnitude, the unit it is
//! expressed in, and the reference frame it is measured against. Sensors build
//! a fresh value on every read.
//!
//! # Example
//! ```rust
//! use drivebase_core::utils::sensors::angle::{Angle, AngleReference, AngleUnit};
//! let heading = Angle::compass_degrees(90.0);
//! let math = heading.to_reference(AngleReference::Cartesian);
//! assert_eq!(math.value(), 0.0);
//! assert_eq!(math.unit(), AngleUnit::Degrees);
//! ```

use core::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Unit an angle magnitude is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    Degrees,
    Radians,
}

impl AngleUnit {
    /// Magnitude of a half turn in this unit.
    fn half_turn(self) -> f32 {
        match self {
            AngleUnit::Degrees => 180.0,
            AngleUnit::Radians => PI,
        }
    }
}

/// Frame an angle is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleReference {
    /// Clockwise from north, as a compass reads.
    CompassHeading,
    /// Counter-clockwise from the +X axis.
    Cartesian,
}

/// A planar orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    value: f32,
    unit: AngleUnit,
    reference: AngleReference,
}

impl Angle {
    pub const fn new(
        value: f32,
        unit: AngleUnit,
        reference: AngleReference,
    ) -> Self {
        Self {
            value,
            unit,
            reference,
        }
    }

    /// Compass heading in degrees, the form every gyro adapter reports.
    pub const fn compass_degrees(value: f32) -> Self {
        Self::new(value, AngleUnit::Degrees, AngleReference::CompassHeading)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    pub fn reference(&self) -> AngleReference {
        self.reference
    }

    /// Magnitude in degrees, regardless of the stored unit.
    pub fn degrees(&self) -> f32 {
        self.to_unit(AngleUnit::Degrees).value
    }

    /// Magnitude in radians, regardless of the stored unit.
    pub fn radians(&self) -> f32 {
        self.to_unit(AngleUnit::Radians).value
    }

    /// Re-express the same angle in `unit`.
    pub fn to_unit(
        &self,
        unit: AngleUnit,
    ) -> Self {
        let value = match (self.unit, unit) {
            (AngleUnit::Degrees, AngleUnit::Radians) => self.value * (PI / 180.0),
            (AngleUnit::Radians, AngleUnit::Degrees) => self.value * (180.0 / PI),
            _ => self.value,
        };
        Self { value, unit, ..*self }
    }

    /// Wrap the magnitude into (-half turn, +half turn].
    pub fn normalized(&self) -> Self {
        let half = self.unit.half_turn();
        let full = 2.0 * half;
        let mut value = libm::fmodf(self.value, full);
        if value > half {
            value -= full;
        } else if value <= -half {
            value += full;
        }
        Self { value, ..*self }
    }

    /// Re-express the angle against another frame.
    ///
    /// Compass headings grow clockwise from north while cartesian angles grow
    /// counter-clockwise from +X, so the conversion is `quarter turn - value`
    /// in both directions.
    pub fn to_reference(
        &self,
        reference: AngleReference,
    ) -> Self {
        if reference == self.reference {
            return *self;
        }
        let quarter = self.unit.half_turn() / 2.0;
        Self {
            value: quarter - self.value,
            reference,
            ..*self
        }
    }
}
