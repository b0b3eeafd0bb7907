//! Heading adapter for fused IMUs.

use super::{Angle, FusedImu, TestableGyro};

/// Exposes a fused IMU as a `TestableGyro`.
///
/// The heading is the yaw component of the extrinsic Z-Y-X orientation. The
/// sensor counts as working when its system status matches the running status
/// of the mode it is configured in, so an IMU in a raw (non-fusion) mode must
/// report `RunningNoFusion`, not `RunningFusion`.
pub struct ImuHeading<I> {
    imu: I,
}

impl<I: FusedImu> ImuHeading<I> {
    pub fn new(imu: I) -> Self {
        Self { imu }
    }

    /// Borrow the wrapped driver.
    pub fn inner(&self) -> &I {
        &self.imu
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.imu
    }

    pub fn into_inner(self) -> I {
        self.imu
    }
}

impl<I: FusedImu> TestableGyro for ImuHeading<I> {
    type Error = I::Error;

    fn heading(&mut self) -> Result<Angle, Self::Error> {
        let orientation = self.imu.orientation_zyx()?;
        Ok(Angle::compass_degrees(orientation.z))
    }

    fn is_working(&mut self) -> bool {
        let expected = match self.imu.operation_mode() {
            Ok(mode) => mode.running_status(),
            Err(e) => {
                tracing::warn!(?e, "IMU operation mode read failed");
                return false;
            }
        };
        match self.imu.system_status() {
            Ok(status) => {
                tracing::debug!(?status, ?expected, "IMU status");
                status == expected
            }
            Err(e) => {
                tracing::warn!(?e, "IMU status read failed");
                false
            }
        }
    }
}
