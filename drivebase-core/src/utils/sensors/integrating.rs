//! Heading adapter for integrating single-axis gyros.

use super::{Angle, IntegratingGyro, TestableGyro};

/// Exposes an integrating gyro as a `TestableGyro`.
///
/// A gyro is considered working once its Z scale coefficient is non-zero,
/// which only happens after the device has been initialized and calibrated.
pub struct IntegratedHeading<G> {
    gyro: G,
}

impl<G: IntegratingGyro> IntegratedHeading<G> {
    pub fn new(gyro: G) -> Self {
        Self { gyro }
    }

    pub fn inner(&self) -> &G {
        &self.gyro
    }

    pub fn inner_mut(&mut self) -> &mut G {
        &mut self.gyro
    }

    pub fn into_inner(self) -> G {
        self.gyro
    }
}

impl<G: IntegratingGyro> TestableGyro for IntegratedHeading<G> {
    type Error = G::Error;

    fn heading(&mut self) -> Result<Angle, Self::Error> {
        let z = self.gyro.integrated_z()?;
        Ok(Angle::compass_degrees(z))
    }

    fn is_working(&mut self) -> bool {
        match self.gyro.z_axis_scale_coefficient() {
            Ok(scale) => scale != 0.0,
            Err(e) => {
                tracing::warn!(?e, "gyro scale coefficient read failed");
                false
            }
        }
    }
}
