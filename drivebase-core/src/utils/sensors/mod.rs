//! Heading sensors.
//!
//! Two structurally different gyro families are normalized behind one
//! capability, `TestableGyro`, so control code never depends on the concrete
//! hardware:
//!
//! - `imu`: fused 3-axis IMUs reporting an absolute orientation.
//! - `integrating`: single-axis gyros reporting an accumulated Z angle.
//! - `icm`: an integrating gyro built on the ICM-42670 over I2C.
//!
//! `FusedImu` and `IntegratingGyro` are the seams a hardware driver has to
//! fill in.

pub mod angle;
pub mod icm;
pub mod imu;
pub mod integrating;

use serde::{Deserialize, Serialize};

pub use angle::{Angle, AngleReference, AngleUnit};
pub use icm::{HeadingIntegrator, Icm42670Gyro};
pub use imu::ImuHeading;
pub use integrating::IntegratedHeading;

/// A heading source that can report whether it is healthy.
///
/// Every call is a fresh hardware read; nothing is cached.
pub trait TestableGyro {
    type Error: core::fmt::Debug;

    /// Current heading of the chassis about the vertical axis.
    fn heading(&mut self) -> Result<Angle, Self::Error>;

    /// Whether the sensor currently looks operational.
    ///
    /// A failed hardware read counts as not working.
    fn is_working(&mut self) -> bool;
}

/// Euler angles in degrees, extrinsic Z-Y-X order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerZyx {
    /// Rotation about Z (yaw), applied first.
    pub z: f32,
    pub y: f32,
    pub x: f32,
}

/// System status reported by a fused IMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Idle,
    SystemError,
    InitializingPeripherals,
    SystemInitialization,
    ExecutingSelfTest,
    RunningFusion,
    RunningNoFusion,
}

impl SystemStatus {
    /// Decode the raw status register value.
    pub fn from_register(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(SystemStatus::Idle),
            1 => Some(SystemStatus::SystemError),
            2 => Some(SystemStatus::InitializingPeripherals),
            3 => Some(SystemStatus::SystemInitialization),
            4 => Some(SystemStatus::ExecutingSelfTest),
            5 => Some(SystemStatus::RunningFusion),
            6 => Some(SystemStatus::RunningNoFusion),
            _ => None,
        }
    }
}

/// Operating mode a fused IMU is configured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    Config,
    AccOnly,
    MagOnly,
    GyroOnly,
    AccMag,
    AccGyro,
    MagGyro,
    AccMagGyro,
    Imu,
    Compass,
    M4g,
    NdofFmcOff,
    Ndof,
}

impl OperationMode {
    /// Decode the low nibble of the operation mode register.
    pub fn from_register(raw: u8) -> Option<Self> {
        let mode = match raw & 0x0F {
            0x0 => OperationMode::Config,
            0x1 => OperationMode::AccOnly,
            0x2 => OperationMode::MagOnly,
            0x3 => OperationMode::GyroOnly,
            0x4 => OperationMode::AccMag,
            0x5 => OperationMode::AccGyro,
            0x6 => OperationMode::MagGyro,
            0x7 => OperationMode::AccMagGyro,
            0x8 => OperationMode::Imu,
            0x9 => OperationMode::Compass,
            0xA => OperationMode::M4g,
            0xB => OperationMode::NdofFmcOff,
            0xC => OperationMode::Ndof,
            _ => return None,
        };
        Some(mode)
    }

    /// Whether the mode fuses several raw sensors into one orientation.
    pub fn is_fusion(self) -> bool {
        matches!(
            self,
            OperationMode::Imu
                | OperationMode::Compass
                | OperationMode::M4g
                | OperationMode::NdofFmcOff
                | OperationMode::Ndof
        )
    }

    /// Status a healthy sensor reports while running in this mode.
    pub fn running_status(self) -> SystemStatus {
        if self.is_fusion() {
            SystemStatus::RunningFusion
        } else {
            SystemStatus::RunningNoFusion
        }
    }
}

/// Driver seam for an IMU that fuses its raw sensors into an orientation.
pub trait FusedImu {
    type Error: core::fmt::Debug;

    /// Absolute orientation in degrees, extrinsic Z-Y-X.
    fn orientation_zyx(&mut self) -> Result<EulerZyx, Self::Error>;

    fn system_status(&mut self) -> Result<SystemStatus, Self::Error>;

    fn operation_mode(&mut self) -> Result<OperationMode, Self::Error>;
}

/// Driver seam for a gyro that integrates its Z rate into an angle.
pub trait IntegratingGyro {
    type Error: core::fmt::Debug;

    /// Accumulated Z rotation in degrees.
    fn integrated_z(&mut self) -> Result<f32, Self::Error>;

    /// Scale coefficient applied to the raw Z rate. Zero until calibrated.
    fn z_axis_scale_coefficient(&mut self) -> Result<f32, Self::Error>;
}
