use clap::Parser;
use drivebase_core::utils::config::HardwareConfig;
use drivebase_core::utils::controllers::{
    DriveCommand, DriveController, MecanumDrivetrain, MotorActuator, Wheel, DRIVE_CHANNEL,
};
use drivebase_core::utils::sensors::{
    Angle, EulerZyx, FusedImu, HeadingIntegrator, ImuHeading, IntegratedHeading, IntegratingGyro,
    OperationMode, SystemStatus, TestableGyro,
};
use embassy_executor::{Executor, Spawner};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;
use std::convert::Infallible;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// hardware config (JSON); built-in defaults when omitted
    #[clap(long)]
    config: Option<PathBuf>,
    /// file with one JSON drive command per line, replaces the generated cycles
    #[clap(long)]
    script: Option<PathBuf>,
    /// wheel powers: front-left back-left front-right back-right
    #[clap(long, num_args = 4, allow_negative_numbers = true, default_values_t = [0.5, 0.5, 0.5, 0.5])]
    powers: Vec<f32>,
    /// number of power/status cycles to run
    #[clap(long, default_value_t = 5)]
    cycles: u32,
    /// simulated yaw change: degrees per read (fused IMU) or degrees per second (integrating gyro)
    #[clap(long, default_value_t = 2.5, allow_negative_numbers = true)]
    yaw_rate: f32,
    /// run the simulated IMU in a raw (non-fusion) mode
    #[clap(long)]
    no_fusion: bool,
    /// use a simulated integrating gyro, calibrated from the config, instead of the fused IMU
    #[clap(long)]
    integrating: bool,
    /// rest bias of the simulated integrating gyro, in degrees per second
    #[clap(long, default_value_t = 0.3, allow_negative_numbers = true)]
    gyro_bias: f32,
}

/// IMU that turns at a constant rate and always reports itself running.
struct SimImu {
    yaw: f32,
    rate: f32,
    mode: OperationMode,
}

impl FusedImu for SimImu {
    type Error = Infallible;

    fn orientation_zyx(&mut self) -> Result<EulerZyx, Infallible> {
        self.yaw += self.rate;
        Ok(EulerZyx {
            z: self.yaw,
            ..Default::default()
        })
    }

    fn system_status(&mut self) -> Result<SystemStatus, Infallible> {
        Ok(self.mode.running_status())
    }

    fn operation_mode(&mut self) -> Result<OperationMode, Infallible> {
        Ok(self.mode)
    }
}

/// Single-axis gyro turning at a constant rate on top of a fixed rest bias.
///
/// Every heading read advances the simulation by one command period.
struct SimRateGyro {
    rate: f32,
    bias: f32,
    scale: f32,
    integrator: HeadingIntegrator,
}

impl SimRateGyro {
    const PERIOD: Duration = Duration::from_millis(20);

    /// Average `samples` readings taken at rest and arm the scale.
    fn calibrate(
        &mut self,
        samples: u16,
    ) -> Option<f32> {
        if samples == 0 {
            return None;
        }
        let sum: f32 = (0..samples).map(|_| self.bias).sum();
        let bias = sum / samples as f32;
        self.integrator.set_calibration(bias, self.scale);
        self.integrator.reset();
        Some(bias)
    }
}

impl IntegratingGyro for SimRateGyro {
    type Error = Infallible;

    fn integrated_z(&mut self) -> Result<f32, Infallible> {
        let dt_secs = Self::PERIOD.as_micros() as f32 / 1_000_000.0;
        Ok(self.integrator.accumulate(self.rate + self.bias, dt_secs))
    }

    fn z_axis_scale_coefficient(&mut self) -> Result<f32, Infallible> {
        Ok(self.integrator.scale())
    }
}

/// Either heading source, so one drive task serves both.
enum RigGyro {
    Fused(ImuHeading<SimImu>),
    Integrating(IntegratedHeading<SimRateGyro>),
}

impl TestableGyro for RigGyro {
    type Error = Infallible;

    fn heading(&mut self) -> Result<Angle, Infallible> {
        match self {
            RigGyro::Fused(g) => g.heading(),
            RigGyro::Integrating(g) => g.heading(),
        }
    }

    fn is_working(&mut self) -> bool {
        match self {
            RigGyro::Fused(g) => g.is_working(),
            RigGyro::Integrating(g) => g.is_working(),
        }
    }
}

/// Motor that logs the power it is given.
struct SimMotor {
    wheel: Wheel,
    inverted: bool,
}

impl MotorActuator for SimMotor {
    type Error = Infallible;

    fn set_power(&mut self, power: f32) -> Result<(), Infallible> {
        let applied = if self.inverted { -power } else { power };
        info!(wheel = ?self.wheel, power, applied, "motor power");
        Ok(())
    }
}

type RigController = DriveController<RigGyro, MecanumDrivetrain<SimMotor>>;

#[embassy_executor::task]
async fn drive_task(mut ctrl: RigController) -> ! {
    ctrl.drive_ch().await
}

fn load_config(opts: &Opts) -> Result<HardwareConfig, String> {
    match &opts.config {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            HardwareConfig::from_json(&bytes).map_err(|e| format!("{}: {}", path.display(), e))
        }
        None => Ok(HardwareConfig::default()),
    }
}

fn load_script(path: &PathBuf) -> Result<Vec<DriveCommand>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| format!("{}:{}: {}", path.display(), n + 1, e))
        })
        .collect()
}

fn build_commands(opts: &Opts) -> Result<Vec<DriveCommand>, String> {
    if let Some(path) = &opts.script {
        return load_script(path);
    }
    let p = &opts.powers;
    let mut commands = Vec::new();
    for _ in 0..opts.cycles {
        commands.push(DriveCommand::P {
            fl: p[0],
            bl: p[1],
            fr: p[2],
            br: p[3],
        });
        commands.push(DriveCommand::Status);
    }
    commands.push(DriveCommand::Stop);
    Ok(commands)
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner, opts: Opts) {
    let (config, commands) = match load_config(&opts).and_then(|c| Ok((c, build_commands(&opts)?))) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "PWM board at 0x{:02X}, prescale {} (simulated)",
        config.pwm_address, config.pwm_prescale
    );

    let gyro = if opts.integrating {
        let mut sim = SimRateGyro {
            rate: opts.yaw_rate,
            bias: opts.gyro_bias,
            scale: config.gyro_scale,
            integrator: HeadingIntegrator::new(),
        };
        match sim.calibrate(config.calibration_samples) {
            Some(bias) => info!(
                bias,
                scale = config.gyro_scale,
                samples = config.calibration_samples,
                "gyro calibrated"
            ),
            None => warn!("calibration_samples is 0, gyro left uncalibrated"),
        }
        RigGyro::Integrating(IntegratedHeading::new(sim))
    } else {
        let mode = if opts.no_fusion {
            OperationMode::AccMagGyro
        } else {
            OperationMode::Ndof
        };
        RigGyro::Fused(ImuHeading::new(SimImu {
            yaw: 0.0,
            rate: opts.yaw_rate,
            mode,
        }))
    };
    let motor = |wheel: Wheel| SimMotor {
        wheel,
        inverted: config.motors[wheel.index()].inverted,
    };
    let drive = MecanumDrivetrain::new(
        motor(Wheel::FrontLeft),
        motor(Wheel::BackLeft),
        motor(Wheel::FrontRight),
        motor(Wheel::BackRight),
    );
    spawner.spawn(drive_task(DriveController::new(gyro, drive))).unwrap();

    info!("Sending {} drive commands", commands.len());
    for command in commands {
        DRIVE_CHANNEL.send(command).await;
        Timer::after(Duration::from_millis(20)).await;
    }
    info!("Done");
    std::process::exit(0);
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();
    let opts: Opts = Opts::parse();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner, opts)).unwrap();
    });
}
