//! Uniform error type for the hardware backends in this crate.

use core::fmt;

/// Errors reported by the hardware backends (IMU, PWM motor board).
///
/// The gyro and drivetrain adapters never produce these themselves; they
/// forward whatever their backend reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HardwareError<E> {
    /// Error from the underlying driver or bus.
    Bus(E),
    /// The device handle has not been initialized.
    ///
    /// Reserved for backends that track their own connection state; the
    /// ICM-42670 and PCA9685 backends report bus failures as `Bus` instead.
    Disconnected,
    /// The device did not answer in time.
    ///
    /// Reserved for backends with a read deadline; none of the bundled
    /// backends produce it.
    Timeout,
    /// A command value outside the range the device accepts.
    OutOfRange { value: f32 },
}

impl<E: fmt::Debug> fmt::Display for HardwareError<E> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            HardwareError::Bus(e) => write!(f, "bus error: {:?}", e),
            HardwareError::Disconnected => f.write_str("device not initialized"),
            HardwareError::Timeout => f.write_str("device timed out"),
            HardwareError::OutOfRange { value } => {
                write!(f, "value {} outside accepted range", value)
            }
        }
    }
}
