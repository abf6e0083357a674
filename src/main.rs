use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strokeplot::{
    init_logging, list_ports, load_polylines, save_polylines, Config, DeviceLink, Pipeline,
    BUILD_DATE, VERSION,
};
use tracing::info;

/// Turn vector line data into plotter strokes
#[derive(Debug, Parser)]
#[command(name = "strokeplot", version, about)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serial port, overriding the configuration
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clip, merge and order polylines, then write them normalized
    Prepare { input: PathBuf, output: PathBuf },
    /// Run the full pipeline and send the waveform to the device
    Draw { input: PathBuf },
    /// Set the device's indicator light
    Light { r: u8, g: u8, b: u8 },
    /// List serial ports a plotter could be attached to
    Ports,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    info!("StrokePlot {} (built {})", VERSION, BUILD_DATE);

    let mut config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.connection.port = port;
    }

    match cli.command {
        Command::Prepare { input, output } => {
            let polylines = load_polylines(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let pipeline = Pipeline::from_config(&config)?;
            let (prepared, _) = pipeline.prepare(polylines);
            save_polylines(&output, &prepared)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote {} polylines to {}", prepared.len(), output.display());
        }
        Command::Draw { input } => {
            let polylines = load_polylines(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let pipeline = Pipeline::from_config(&config)?;
            let (points, _) = pipeline.run(polylines);

            let _enter = pipeline.span().enter();
            let mut link =
                DeviceLink::open(&config.connection).context("Failed to connect to device")?;
            link.draw(&points).context("Waveform transaction failed")?;
            info!("Device accepted {} points", points.len());
        }
        Command::Light { r, g, b } => {
            let mut link =
                DeviceLink::open(&config.connection).context("Failed to connect to device")?;
            link.set_indicator_light(r, g, b)
                .context("Indicator light transaction failed")?;
        }
        Command::Ports => {
            let ports = list_ports()?;
            if ports.is_empty() {
                println!("No serial ports found");
            }
            for port in ports {
                println!("{}", port);
            }
        }
    }

    Ok(())
}
