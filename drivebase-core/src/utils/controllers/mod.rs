//! Drivetrain control.
//!
//! - `drive`: the `MecanumDrive` capability and its four-motor adapter.
//! - `pwm`: DC motors on a PCA9685 PWM board.
//!
//! `DriveController` ties a heading source and a drivetrain together and
//! executes `DriveCommand`s received over `DRIVE_CHANNEL`.

pub mod drive;
pub mod pwm;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

pub use drive::{MecanumDrive, MecanumDrivetrain, MotorActuator, MotorPowers, Wheel, WHEELBASE_WIDTH};
pub use pwm::{configure_board, init_board, pca_drivetrain, PcaMotor};

use crate::utils::sensors::{Angle, TestableGyro};

/// Channel used to receive drive commands (`DriveCommand` messages).
pub static DRIVE_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    DriveCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Drive command variants.
///
/// Serialized as JSON with tag `"dc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "dc", rename_all = "snake_case")] // dc = drive command
pub enum DriveCommand {
    /// Set all four wheel powers (front-left, back-left, front-right, back-right).
    P { fl: f32, bl: f32, fr: f32, br: f32 },
    /// Zero power on every wheel.
    Stop,
    /// Read the current heading.
    ReadHeading,
    /// Heading, gyro health and chassis geometry.
    Status,
}

/// Snapshot returned by `ReadHeading` and `Status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// `None` when the heading read failed during a `Status` request.
    pub heading: Option<Angle>,
    pub working: bool,
    pub wheelbase_width: f64,
}

#[derive(Debug)]
pub enum ControllerError<G, D> {
    Gyro(G),
    Drive(D),
}

/// Owns the heading source and the drivetrain of one robot.
pub struct DriveController<G, D> {
    pub gyro: G,
    pub drive: D,
}

impl<G, D> DriveController<G, D>
where
    G: TestableGyro,
    D: MecanumDrive,
{
    pub fn new(
        gyro: G,
        drive: D,
    ) -> Self {
        Self { gyro, drive }
    }

    /// Execute a single `DriveCommand`.
    ///
    /// Returns telemetry for `ReadHeading` and `Status`, `None` otherwise.
    pub fn execute_command(
        &mut self,
        command: DriveCommand,
    ) -> Result<Option<Telemetry>, ControllerError<G::Error, D::Error>> {
        match command {
            DriveCommand::P { fl, bl, fr, br } => {
                self.drive
                    .set_motor_powers(fl, bl, fr, br)
                    .map_err(ControllerError::Drive)?;
                Ok(None)
            }
            DriveCommand::Stop => {
                self.drive
                    .set_motor_powers(0.0, 0.0, 0.0, 0.0)
                    .map_err(ControllerError::Drive)?;
                Ok(None)
            }
            DriveCommand::ReadHeading => {
                let heading = self.gyro.heading().map_err(ControllerError::Gyro)?;
                Ok(Some(Telemetry {
                    heading: Some(heading),
                    working: self.gyro.is_working(),
                    wheelbase_width: self.drive.wheelbase_width(),
                }))
            }
            DriveCommand::Status => {
                let heading = match self.gyro.heading() {
                    Ok(h) => Some(h),
                    Err(e) => {
                        tracing::warn!(?e, "heading read failed");
                        None
                    }
                };
                Ok(Some(Telemetry {
                    heading,
                    working: self.gyro.is_working(),
                    wheelbase_width: self.drive.wheelbase_width(),
                }))
            }
        }
    }

    /// Receive commands from `DRIVE_CHANNEL` forever.
    pub async fn drive_ch(&mut self) -> ! {
        loop {
            let command = DRIVE_CHANNEL.receiver().receive().await;
            tracing::info!("Received drive command: {:?}", command);
            match self.execute_command(command) {
                Ok(Some(telemetry)) => {
                    tracing::info!(
                        heading = ?telemetry.heading,
                        working = telemetry.working,
                        "Gyro read"
                    );
                }
                Ok(None) => tracing::debug!("drive command executed"),
                Err(e) => tracing::error!(?e, "drive command failed"),
            }
        }
    }
}
