//! Integrating gyro built on the ICM-42670 IMU.
//!
//! The ICM-42670 only reports angular rates, so the Z rate is integrated in
//! software by `HeadingIntegrator`. Until `calibrate` has measured the rest
//! bias the scale coefficient stays at zero, which makes the gyro report
//! itself as not working through `IntegratedHeading`.

use core::cell::RefCell;

use embassy_time::Duration;
use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use icm42670::{Address as ImuAddress, Error as ImuError, Icm42670, PowerMode};

use super::IntegratingGyro;
use crate::utils::config::HardwareConfig;
use crate::utils::error::HardwareError;

/// Default scale coefficient applied once calibration succeeds.
pub const DEFAULT_GYRO_SCALE: f32 = 1.0;

/// Accumulates a Z rate (°/s) into a heading (°).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingIntegrator {
    bias: f32,
    scale: f32,
    heading: f32,
}

impl HeadingIntegrator {
    /// An uncalibrated integrator: zero bias, zero scale, zero heading.
    pub const fn new() -> Self {
        Self {
            bias: 0.0,
            scale: 0.0,
            heading: 0.0,
        }
    }

    pub fn set_calibration(
        &mut self,
        bias: f32,
        scale: f32,
    ) {
        self.bias = bias;
        self.scale = scale;
    }

    /// Add `(rate - bias) * scale * dt` to the heading.
    pub fn accumulate(
        &mut self,
        rate_dps: f32,
        dt_secs: f32,
    ) -> f32 {
        self.heading += (rate_dps - self.bias) * self.scale * dt_secs;
        self.heading
    }

    pub fn reset(&mut self) {
        self.heading = 0.0;
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// ICM-42670 on a shared I2C bus, integrated into a Z heading.
pub struct Icm42670Gyro<'a, I2C> {
    imu: Icm42670<RefCellDevice<'a, I2C>>,
    integrator: HeadingIntegrator,
    scale: f32,
}

impl<'a, I2C, E> Icm42670Gyro<'a, I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    /// Initialize the IMU on `i2c_bus`. The gyro stays uncalibrated until
    /// `calibrate` is called; `scale` defaults to `DEFAULT_GYRO_SCALE`.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        scale: Option<f32>,
    ) -> Result<Self, HardwareError<ImuError<E>>> {
        let imu = Icm42670::new(RefCellDevice::new(i2c_bus), ImuAddress::Primary)
            .map_err(HardwareError::Bus)?;
        tracing::info!("ICM-42670 initialized");
        Ok(Self {
            imu,
            integrator: HeadingIntegrator::new(),
            scale: scale.unwrap_or(DEFAULT_GYRO_SCALE),
        })
    }

    /// Initialize the IMU with `config.gyro_scale` and calibrate it over
    /// `config.calibration_samples` readings.
    pub fn from_config(
        i2c_bus: &'a RefCell<I2C>,
        config: &HardwareConfig,
    ) -> Result<Self, HardwareError<ImuError<E>>> {
        let mut gyro = Self::new(i2c_bus, Some(config.gyro_scale))?;
        gyro.calibrate(config.calibration_samples)?;
        Ok(gyro)
    }

    /// Average `samples` Z-rate readings as the rest bias and arm the scale
    /// coefficient. The robot must be still while this runs.
    pub fn calibrate(
        &mut self,
        samples: u16,
    ) -> Result<f32, HardwareError<ImuError<E>>> {
        if samples == 0 {
            return Err(HardwareError::OutOfRange { value: 0.0 });
        }
        let mut sum = 0.0f32;
        for _ in 0..samples {
            sum += self.read_rate_z()?;
        }
        let bias = sum / samples as f32;
        self.integrator.set_calibration(bias, self.scale);
        self.integrator.reset();
        tracing::info!(bias, scale = self.scale, "gyro calibrated");
        Ok(bias)
    }

    /// Read the Z rate once and integrate it over `dt`. Returns the new heading.
    pub fn update(
        &mut self,
        dt: Duration,
    ) -> Result<f32, HardwareError<ImuError<E>>> {
        let rate = self.read_rate_z()?;
        let dt_secs = dt.as_micros() as f32 / 1_000_000.0;
        Ok(self.integrator.accumulate(rate, dt_secs))
    }

    /// Zero the accumulated heading, keeping the calibration.
    pub fn reset(&mut self) {
        self.integrator.reset();
    }

    /// Wake the IMU into low-noise six-axis mode, or put it to sleep.
    pub fn set_power(
        &mut self,
        enabled: bool,
    ) -> Result<(), HardwareError<ImuError<E>>> {
        let mode = if enabled {
            PowerMode::SixAxisLowNoise
        } else {
            PowerMode::Sleep
        };
        self.imu.set_power_mode(mode).map_err(HardwareError::Bus)
    }

    pub fn integrator(&self) -> &HeadingIntegrator {
        &self.integrator
    }

    fn read_rate_z(&mut self) -> Result<f32, HardwareError<ImuError<E>>> {
        let gyro = self.imu.gyro_norm().map_err(HardwareError::Bus)?;
        Ok(gyro.z)
    }
}

impl<I2C, E> IntegratingGyro for Icm42670Gyro<'_, I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    type Error = HardwareError<ImuError<E>>;

    fn integrated_z(&mut self) -> Result<f32, Self::Error> {
        Ok(self.integrator.heading())
    }

    fn z_axis_scale_coefficient(&mut self) -> Result<f32, Self::Error> {
        Ok(self.integrator.scale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncalibrated_integrator_holds_zero() {
        let mut integ = HeadingIntegrator::new();
        assert_eq!(integ.accumulate(90.0, 1.0), 0.0);
        assert_eq!(integ.scale(), 0.0);
    }

    #[test]
    fn test_integrates_bias_corrected_rate() {
        let mut integ = HeadingIntegrator::new();
        integ.set_calibration(0.5, 1.0);
        integ.accumulate(10.5, 0.5);
        integ.accumulate(10.5, 0.5);
        assert!(libm::fabsf(integ.heading() - 10.0) < 1e-5);
        integ.reset();
        assert_eq!(integ.heading(), 0.0);
        assert_eq!(integ.bias(), 0.5);
    }

    #[test]
    fn test_scale_multiplies_rate() {
        let mut integ = HeadingIntegrator::new();
        integ.set_calibration(0.0, 2.0);
        integ.accumulate(-3.0, 2.0);
        assert!(libm::fabsf(integ.heading() + 12.0) < 1e-5);
    }
}
