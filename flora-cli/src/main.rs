//! Command line reader for flower care plant sensors
//!
//! Reads firmware, battery and live measurements from one sensor, either
//! through BlueZ's gatttool or directly through the Bluetooth stack.

mod config;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use flora_ble::BtleTransport;
use flora_device::gatttool::GattTool;
use flora_device::{DeviceState, FirmwareInfo, Miflora, Transport};
use std::error::Error as _;

use config::{FileConfig, Overrides, Settings, TransportKind};
use output::Report;

#[derive(Parser)]
#[command(name = "flora")]
#[command(about = "Read flower care plant sensors over BLE")]
struct Cli {
    /// Device address, e.g. C4:7C:8D:6A:3E:11
    #[arg(short, long, global = true)]
    device: Option<String>,
    /// Local Bluetooth adapter [default: hci0]
    #[arg(short, long, global = true)]
    adapter: Option<String>,
    /// How to reach the device [default: gatttool]
    #[arg(short, long, global = true, value_enum)]
    transport: Option<TransportKind>,
    /// gatttool program to run [default: gatttool]
    #[arg(long, global = true)]
    gatttool: Option<String>,
    /// Seconds to look for the device (btle transport) [default: 10]
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    /// More logging, repeat for more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read firmware version and battery level
    Firmware,
    /// Read temperature, moisture, light and conductivity
    Sensors {
        /// Treat the device as running this firmware version instead of
        /// assuming nothing, e.g. to force the realtime enable write
        #[arg(long)]
        assume_firmware: Option<String>,
    },
    /// Read firmware, then sensors
    Read,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            device: self.device.clone(),
            adapter: self.adapter.clone(),
            transport: self.transport,
            gatttool: self.gatttool.clone(),
            lookup_timeout_secs: self.timeout,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file = match config::flora_home() {
        Some(home) => FileConfig::load(&home)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, cli.overrides())?;
    log::debug!("{settings:?}");

    let transport = open_transport(&settings)?;
    let mut report = Report::default();

    match cli.command {
        Commands::Firmware => {
            let mut flora = Miflora::new(transport, settings.device);
            report.firmware = Some(flora.read_firmware()?);
        }
        Commands::Sensors { assume_firmware } => {
            // battery is unknown here and never reported
            let state = assume_firmware
                .map(|version| DeviceState::with_firmware(FirmwareInfo::new(version, 0)))
                .unwrap_or_default();
            let mut flora = Miflora::with_state(transport, settings.device, state);
            report.sensors = Some(flora.read_sensors()?);
        }
        Commands::Read => {
            let mut flora = Miflora::new(transport, settings.device);
            report.firmware = Some(flora.read_firmware()?);
            report.sensors = Some(flora.read_sensors()?);
        }
    }

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

fn open_transport(settings: &Settings) -> Result<Box<dyn Transport>, Box<dyn std::error::Error>> {
    let transport: Box<dyn Transport> = match settings.transport {
        TransportKind::Gatttool => Box::new(GattTool::new(settings.gatttool.clone())),
        TransportKind::Btle => {
            Box::new(BtleTransport::new()?.with_lookup_timeout(settings.lookup_timeout))
        }
    };
    Ok(transport)
}
