//! PCA9685-driven DC motors.
//!
//! Each motor uses two channels of a shared PCA9685 board: a phase channel
//! selecting direction and an enable channel carrying the duty cycle.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use super::drive::{MecanumDrivetrain, MotorActuator, Wheel};
use crate::utils::config::{ConfigError, HardwareConfig};
use crate::utils::error::HardwareError;

const MAX_DUTY: u16 = 4095;

/// Map a 0-15 index onto a PCA9685 output channel.
pub fn channel_from_index(index: u8) -> Option<Channel> {
    let channel = match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };
    Some(channel)
}

/// Enable the board and set its prescale.
pub fn configure_board<I2C, E>(
    board: &RefCell<Pca9685<I2C>>,
    prescale: u8,
) -> Result<(), HardwareError<PwmError<E>>>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    let mut pca = board.borrow_mut();
    pca.enable().map_err(HardwareError::Bus)?;
    tracing::info!("PWM enabled");
    pca.set_prescale(prescale).map_err(HardwareError::Bus)?;
    tracing::info!(prescale, "PWM prescale set");
    Ok(())
}

/// Create the board at `config.pwm_address` on the shared bus and configure
/// it with `config.pwm_prescale`.
pub fn init_board<'a, I2C, E>(
    i2c_bus: &'a RefCell<I2C>,
    config: &HardwareConfig,
) -> Result<RefCell<Pca9685<RefCellDevice<'a, I2C>>>, HardwareError<PwmError<E>>>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    let pwm = Pca9685::new(
        RefCellDevice::new(i2c_bus),
        PwmAddress::from(config.pwm_address),
    )
    .map_err(HardwareError::Bus)?;
    tracing::info!("PWM board at 0x{:02X}", config.pwm_address);
    let board = RefCell::new(pwm);
    configure_board(&board, config.pwm_prescale)?;
    Ok(board)
}

/// One DC motor on a phase/enable channel pair.
pub struct PcaMotor<'a, I2C> {
    board: &'a RefCell<Pca9685<I2C>>,
    phase: Channel,
    enable: Channel,
    inverted: bool,
}

impl<'a, I2C> PcaMotor<'a, I2C> {
    pub fn new(
        board: &'a RefCell<Pca9685<I2C>>,
        phase: Channel,
        enable: Channel,
        inverted: bool,
    ) -> Self {
        Self {
            board,
            phase,
            enable,
            inverted,
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }
}

impl<I2C, E> MotorActuator for PcaMotor<'_, I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    type Error = HardwareError<PwmError<E>>;

    /// Rejects non-finite powers and anything outside [-1.0, 1.0].
    ///
    /// The enable channel is switched off before the phase changes, so a
    /// failed write leaves the motor stopped rather than running the old
    /// duty in the new direction.
    fn set_power(
        &mut self,
        power: f32,
    ) -> Result<(), Self::Error> {
        if !power.is_finite() || libm::fabsf(power) > 1.0 {
            tracing::warn!(power, "motor power out of range");
            return Err(HardwareError::OutOfRange { value: power });
        }
        let power = if self.inverted { -power } else { power };
        let reverse = power < 0.0;
        let duty = (libm::fabsf(power) * MAX_DUTY as f32) as u16;

        let mut pca = self.board.borrow_mut();
        pca.set_channel_on_off(self.enable, 0, 0)
            .map_err(HardwareError::Bus)?;
        pca.set_channel_on_off(self.phase, 0, if reverse { MAX_DUTY } else { 0 })
            .map_err(HardwareError::Bus)?;
        if duty > 0 {
            pca.set_channel_on_off(self.enable, 0, duty)
                .map_err(HardwareError::Bus)?;
        }
        Ok(())
    }
}

/// Build a drivetrain from the channel layout in `config`.
pub fn pca_drivetrain<'a, I2C>(
    board: &'a RefCell<Pca9685<I2C>>,
    config: &HardwareConfig,
) -> Result<MecanumDrivetrain<PcaMotor<'a, I2C>>, ConfigError>
where
    I2C: I2c,
{
    let motor = |wheel: Wheel| -> Result<PcaMotor<'a, I2C>, ConfigError> {
        let (phase, enable) = config.motor_channels(wheel)?;
        Ok(PcaMotor::new(
            board,
            phase,
            enable,
            config.motors[wheel.index()].inverted,
        ))
    };
    Ok(MecanumDrivetrain::new(
        motor(Wheel::FrontLeft)?,
        motor(Wheel::BackLeft)?,
        motor(Wheel::FrontRight)?,
        motor(Wheel::BackRight)?,
    ))
}
