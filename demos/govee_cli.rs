//! CLI application for controlling Govee lights.
//!
//! This example demonstrates the quota-aware client: every command reports
//! how much of the daily API budget is left.
//!
//! Run with: GOVEE_API_KEY=... cargo run --example govee_cli -- --help

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use govee_lights_rs::{
    Brightness, ClientConfig, Color, Device, GoveeClient, Light, Poller, TurnOn, read_sensors,
};

#[derive(Parser)]
#[command(name = "govee-cli")]
#[command(about = "Control Govee smart lights from the command line", long_about = None)]
struct Cli {
    /// Govee API key (defaults to the GOVEE_API_KEY environment variable)
    #[arg(short, long, global = true)]
    api_key: Option<String>,

    /// Where to persist the daily quota record
    #[arg(short, long, global = true, default_value = "govee_rate_limit.json")]
    storage: PathBuf,

    /// Disable local quota tracking
    #[arg(long, global = true)]
    no_rate_limit: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the devices on the account
    Devices,

    /// Get the current state of a device
    State {
        /// Device id, as shown by `devices`
        device: String,
    },

    /// Turn a device on
    On {
        device: String,
        /// Brightness on the 0-255 scale
        #[arg(short, long)]
        brightness: Option<u8>,
        /// RGB color as "r,g,b"
        #[arg(short, long)]
        color: Option<Color>,
    },

    /// Turn a device off
    Off { device: String },

    /// Set brightness (0-100)
    Brightness {
        device: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },

    /// Set RGB color (0-255 for each component)
    Color {
        device: String,
        red: u8,
        green: u8,
        blue: u8,
    },

    /// Show quota usage and diagnostic sensors
    Quota,

    /// Poll every device until interrupted
    Watch,
}

async fn find_device(client: &GoveeClient, id: &str) -> Result<Device, Box<dyn std::error::Error>> {
    let devices = client.devices().await?;
    devices
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| format!("No device with id {}", id).into())
}

fn print_quota(client: &GoveeClient) {
    match client.rate_limit_status() {
        Some(status) => println!(
            "Quota: {}/{} used today ({:.1}%), next poll in {}s",
            status.request_count,
            status.request_count + status.remaining_requests,
            status.usage_percentage(),
            status.adaptive_interval_seconds
        ),
        None => println!("Quota tracking disabled"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let api_key = match cli.api_key {
        Some(key) => key,
        None => std::env::var("GOVEE_API_KEY")
            .map_err(|_| "API key is required. Use --api-key or set GOVEE_API_KEY")?,
    };
    let config = ClientConfig::new(&api_key)
        .storage_path(&cli.storage)
        .rate_limiting(!cli.no_rate_limit);
    let client = Arc::new(GoveeClient::new(config)?);

    match cli.command {
        Commands::Devices => {
            let devices = client.devices().await?;
            if devices.is_empty() {
                println!("No devices found on this account.");
            } else {
                println!("Found {} device(s):", devices.len());
                for device in devices {
                    println!(
                        "  {:24}  {:8}  {}  [{}]",
                        device.id,
                        device.model,
                        device.name(),
                        device.support_cmds.join(", ")
                    );
                }
            }
        }

        Commands::State { device } => {
            let device = find_device(&client, &device).await?;
            let mut light = Light::new(device);
            let name = light.name();
            let state = light.refresh(&client).await?;

            println!("{}:", name);
            println!("  Online: {}", state.online().unwrap_or(false));
            println!("  Power: {}", if state.is_on() { "ON" } else { "OFF" });
            if let Some(brightness) = state.brightness() {
                println!("  Brightness: {}%", brightness.value());
            }
            if let Some(color) = state.color() {
                println!(
                    "  Color: RGB({}, {}, {})",
                    color.red(),
                    color.green(),
                    color.blue()
                );
            }
            if let Some(kelvin) = state.color_temperature() {
                println!("  Temperature: {}K", kelvin);
            }
        }

        Commands::On {
            device,
            brightness,
            color,
        } => {
            let device = find_device(&client, &device).await?;
            let mut options = TurnOn::new();
            if let Some(brightness) = brightness {
                options = options.brightness(brightness);
            }
            if let Some(color) = color {
                options = options.rgb(color);
            }
            let mut light = Light::new(device);
            light.turn_on(&client, &options).await?;
            println!("{} turned on", light.name());
        }

        Commands::Off { device } => {
            let device = find_device(&client, &device).await?;
            client.turn_off(&device).await?;
            println!("{} turned off", device.name());
        }

        Commands::Brightness { device, level } => {
            let device = find_device(&client, &device).await?;
            let brightness = Brightness::create(level).ok_or("Brightness must be 0-100")?;
            client.set_brightness(&device, brightness).await?;
            println!("{} brightness set to {}%", device.name(), level);
        }

        Commands::Color {
            device,
            red,
            green,
            blue,
        } => {
            let device = find_device(&client, &device).await?;
            client.set_color(&device, Color::rgb(red, green, blue)).await?;
            println!("{} color set to RGB({}, {}, {})", device.name(), red, green, blue);
        }

        Commands::Quota => {
            for reading in read_sensors(&client) {
                let unit = reading.unit.unwrap_or("");
                println!("{}: {} {}", reading.name, reading.value, unit);
                for (key, value) in &reading.attributes {
                    println!("    {}: {}", key, value);
                }
            }
        }

        Commands::Watch => {
            let mut poller = Poller::new(Arc::clone(&client));
            let count = poller.discover().await?;
            println!("Watching {} device(s), press Ctrl+C to stop", count);

            let cycles = poller
                .run_until(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
            println!("\nStopped after {} poll cycle(s)", cycles);

            for light in poller.lights() {
                let power = if light.is_on() { "ON" } else { "OFF" };
                println!("  {:24}  {:3}  {}", light.id(), power, light.name());
            }
        }
    }

    print_quota(&client);
    Ok(())
}
