//! Reflow oven controller - host application
//!
//! Runs the controller core on the embassy std executor:
//!
//! - Tick task paces the control loop
//! - Controller task owns the controller and the oven link
//! - Telemetry task logs status events
//! - Console thread turns stdin commands into intents
//!
//! ```text
//! reflow-host --port /dev/ttyUSB0 --profile lead-free --start --once
//! reflow-host --port fake          # simulated oven, commands on stdin
//! ```

mod channels;
mod clock;
mod config;
mod link;
mod tasks;
mod transport;

use std::path::PathBuf;

use clap::Parser;
use embassy_executor::Spawner;
use embassy_futures::select::select3;
use eyre::{eyre, WrapErr};
use log::{error, info};

use reflow_core::state::Intent;
use reflow_core::Controller;

use crate::clock::HostClock;
use crate::link::HostLink;

/// Drive a serial reflow oven through a solder profile
#[derive(Debug, Parser)]
#[command(name = "reflow-host", version, about)]
struct Cli {
    /// Machine file
    #[arg(short, long, default_value = "machine.toml")]
    config: PathBuf,

    /// Oven port, overriding `[link] port` (`fake` for the simulator)
    #[arg(short, long)]
    port: Option<String>,

    /// Profile to select at start-up
    #[arg(long)]
    profile: Option<String>,

    /// Start the run immediately
    #[arg(long, requires = "profile")]
    start: bool,

    /// Exit once the run finishes or faults
    #[arg(long)]
    once: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    info!("Reflow host starting");

    if let Err(e) = Box::pin(run(cli)).await {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> eyre::Result<()> {
    let machine = config::load_config(&cli.config)
        .wrap_err_with(|| format!("loading {}", cli.config.display()))?;

    let link = HostLink::new(HostClock, &machine.link);
    let mut controller = Controller::new(link, machine.control)?;
    controller.load_profiles(machine.profiles);

    let names: Vec<&str> = controller.profile_names().collect();
    if names.is_empty() {
        info!("No profiles loaded");
    } else {
        info!("Profiles: {}", names.join(", "));
    }

    for intent in startup_intents(&cli, machine.link.port.as_deref())? {
        controller
            .submit(intent)
            .map_err(|intent| eyre!("intent queue full at start-up ({:?})", intent))?;
    }

    tasks::console::spawn().wrap_err("starting console")?;

    let tick_interval_ms = controller.config().tick_interval_ms;
    select3(
        tasks::controller_task(controller, cli.once),
        tasks::tick_task(tick_interval_ms),
        tasks::telemetry_task(),
    )
    .await;

    tasks::telemetry::flush();
    info!("Reflow host stopped");
    Ok(())
}

/// Intents implied by the command line
fn startup_intents(cli: &Cli, configured_port: Option<&str>) -> eyre::Result<Vec<Intent>> {
    let mut intents = Vec::new();

    if let Some(port) = cli.port.as_deref().or(configured_port) {
        let intent = Intent::connect(port).ok_or_else(|| eyre!("port name too long: {}", port))?;
        intents.push(intent);
    }
    if let Some(profile) = cli.profile.as_deref() {
        let intent = Intent::select_profile(profile)
            .ok_or_else(|| eyre!("profile name too long: {}", profile))?;
        intents.push(intent);
    }
    if cli.start {
        intents.push(Intent::Start);
    }

    Ok(intents)
}
