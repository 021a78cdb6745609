//! Periodic webpage screenshot CLI.

mod cli;

use clap::Parser;
use cli::Cli;
use screengrab_capture::{run_grabber, RunFlag, Settings};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("screengrab={},screengrab_capture={}", level, level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());
    debug!("{:?}", cli);

    let settings = Settings::load(cli.config.as_deref())?;
    let config = cli.into_config(settings);

    // SIGINT, SIGTERM and SIGHUP only clear the flag; the loop finishes its
    // current cycle and shuts down.
    let running = RunFlag::new();
    let running_ctrlc = running.clone();
    ctrlc::set_handler(move || {
        info!("Captured termination request");
        running_ctrlc.stop();
    })?;

    run_grabber(&config, &running)?;

    Ok(())
}
