//! Flyjoy TX-to-Joystick Input Converter
//!
//! Entry point: CLI parsing, logging, device discovery and loop wiring.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use flyjoy::config::{ConverterConfig, OutputBackend};
use flyjoy::converter::Converter;
use flyjoy::pipeline::AxisPipeline;
use flyjoy::sink::{HidSink, OutputSink, XInputSink};
use flyjoy::source::{self, GilrsSource};

#[derive(Parser)]
#[command(name = "flyjoy")]
#[command(about = "TX to joystick input converter")]
struct Cli {
    /// Config file path (default: ~/.config/flyjoy/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output backend (overrides config)
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Physical joystick index (overrides config)
    #[arg(long)]
    joystick: Option<usize>,

    /// List connected joysticks and their axes, then exit
    #[arg(long)]
    list_devices: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Xinput,
    Hid,
}

impl From<BackendArg> for OutputBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Xinput => OutputBackend::XInput,
            BackendArg::Hid => OutputBackend::Hid,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.list_devices {
        return list_devices();
    }

    println!("----------- TX To Joystick Input Converter -----------");

    // Load config
    let config_path = cli.config.unwrap_or_else(ConverterConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let mut config = ConverterConfig::load(&config_path)?;
    if let Some(backend) = cli.backend {
        config.backend = backend.into();
    }
    if let Some(index) = cli.joystick {
        config.joystick_index = index;
    }
    config.validate()?;

    // Resolve the physical joystick
    info!("Fetching connected joysticks...");
    let source = GilrsSource::new(config.joystick_index)?;
    info!(
        "Using joystick {}: {}",
        config.joystick_index,
        source.name()
    );

    // Validate axis wiring against the joystick's control list
    let pipeline = AxisPipeline::new(&config, &source)?;

    // Open the virtual device
    let sink: Box<dyn OutputSink> = match config.backend {
        OutputBackend::XInput => {
            let mut sink = XInputSink::new(&config.device_name)
                .context("Failed to open XInput-style virtual device")?;
            info!("Created XInput-style virtual gamepad: {}", config.device_name);
            if let Some(path) = sink.device_path() {
                info!("Device path: {}", path.display());
            }
            Box::new(sink)
        }
        OutputBackend::Hid => {
            let mut sink = HidSink::new(&config.device_name)
                .context("Failed to open HID-style virtual device")?;
            info!("Created HID-style virtual device: {}", config.device_name);
            if let Some(path) = sink.device_path() {
                info!("Device path: {}", path.display());
            }
            Box::new(sink)
        }
    };

    // Cooperative shutdown on Ctrl+C, observed at tick boundaries
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl+C handler")?;

    let mut converter = Converter::new(source, sink, pipeline, config.tick_hz, shutdown);
    info!("Press Ctrl+C to exit.");

    if let Err(e) = converter.run() {
        error!("Conversion loop aborted: {e}");
        return Err(e.into());
    }

    info!("Shut down cleanly");
    Ok(())
}

fn list_devices() -> Result<()> {
    let devices = source::list_devices()?;
    if devices.is_empty() {
        println!("No joysticks found.");
        return Ok(());
    }
    for device in devices {
        println!(
            "{}: {} (axes: {})",
            device.index,
            device.name,
            device.axes.join(", ")
        );
    }
    Ok(())
}
