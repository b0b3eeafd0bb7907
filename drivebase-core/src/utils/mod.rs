//! Utility re-exports for the drivebase.
//!
//! - `sensors`: heading sources behind the `TestableGyro` capability
//! - `controllers`: the `MecanumDrive` capability, PWM motors and command dispatch
//! - `config`: JSON hardware configuration
//! - `error`: the error type shared by the hardware backends

pub mod config;
pub mod controllers;
pub mod error;
pub mod sensors;

pub use config::HardwareConfig;
pub use controllers::{DriveCommand, DriveController, MecanumDrive, DRIVE_CHANNEL};
pub use embassy_time::Duration;
pub use error::HardwareError;
pub use sensors::{Angle, TestableGyro};
