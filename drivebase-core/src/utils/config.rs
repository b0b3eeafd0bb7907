//! Hardware configuration.
//!
//! Loaded from JSON; every field is optional and falls back to the defaults
//! below.
//!
//! ```json
//! {
//!   "pwm_address": 85,
//!   "motors": [
//!     { "phase": 6, "enable": 7 },
//!     { "phase": 2, "enable": 3 },
//!     { "phase": 4, "enable": 5, "inverted": true },
//!     { "phase": 0, "enable": 1, "inverted": true }
//!   ],
//!   "pwm_prescale": 100,
//!   "gyro_scale": 1.0,
//!   "calibration_samples": 50
//! }
//! ```

use core::fmt;

use pwm_pca9685::Channel;
use serde::{Deserialize, Serialize};

use crate::utils::controllers::drive::Wheel;
use crate::utils::controllers::pwm::channel_from_index;

/// Phase/enable channel pair of one motor on the PWM board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorChannels {
    pub phase: u8,
    pub enable: u8,
    #[serde(default)]
    pub inverted: bool,
}

impl MotorChannels {
    pub const fn new(
        phase: u8,
        enable: u8,
    ) -> Self {
        Self {
            phase,
            enable,
            inverted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// I2C address of the PCA9685 board, used by `init_board`.
    pub pwm_address: u8,
    pub pwm_prescale: u8,
    /// Motors in front-left, back-left, front-right, back-right order.
    pub motors: [MotorChannels; 4],
    /// Scale coefficient armed on the integrating gyro after calibration.
    pub gyro_scale: f32,
    /// Z-rate readings averaged by `Icm42670Gyro::from_config`.
    pub calibration_samples: u16,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            pwm_address: 0x55,
            pwm_prescale: 100,
            motors: [
                MotorChannels::new(6, 7),
                MotorChannels::new(2, 3),
                MotorChannels::new(4, 5),
                MotorChannels::new(0, 1),
            ],
            gyro_scale: 1.0,
            calibration_samples: 50,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    /// Channel index outside 0-15.
    InvalidChannel { wheel: Wheel, index: u8 },
    /// The same board channel is assigned twice.
    DuplicateChannel(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
            ConfigError::InvalidChannel { wheel, index } => {
                write!(f, "{:?}: channel {} is not a PWM output", wheel, index)
            }
            ConfigError::DuplicateChannel(index) => {
                write!(f, "channel {} assigned more than once", index)
            }
        }
    }
}

impl HardwareConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: HardwareConfig = serde_json::from_slice(bytes).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every channel exists and none is used twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut used: u16 = 0;
        for wheel in Wheel::ALL {
            let m = self.motors[wheel.index()];
            for index in [m.phase, m.enable] {
                if channel_from_index(index).is_none() {
                    return Err(ConfigError::InvalidChannel { wheel, index });
                }
                let bit = 1u16 << index;
                if used & bit != 0 {
                    return Err(ConfigError::DuplicateChannel(index));
                }
                used |= bit;
            }
        }
        Ok(())
    }

    /// Board channels `(phase, enable)` for `wheel`.
    pub fn motor_channels(
        &self,
        wheel: Wheel,
    ) -> Result<(Channel, Channel), ConfigError> {
        let m = self.motors[wheel.index()];
        let lookup = |index: u8| {
            channel_from_index(index).ok_or(ConfigError::InvalidChannel { wheel, index })
        };
        Ok((lookup(m.phase)?, lookup(m.enable)?))
    }
}
