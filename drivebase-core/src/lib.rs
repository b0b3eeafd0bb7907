//! Gyro and mecanum drivetrain capability adapters for no-std robots.
//!
//! For a host-side walkthrough, see the `mock-rig` binary in `drivebase-app/`.
#![no_std]

pub mod utils;
