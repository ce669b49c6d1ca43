use std::io;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use dedupe_files::{Cli, Config, Report, format_human_elapsed, inventory, resolver};

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = ConfigBuilder::new();
    builder
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off);
    // Falls back to UTC timestamps when the local offset is unknown.
    let _ = builder.set_time_offset_to_local();

    // Logs go to stderr so the report on stdout stays clean.
    if let Err(e) = TermLogger::init(
        level,
        builder.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialise logging: {e}");
    }
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;

    init_logging(config.verbose);
    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    debug!("Command line arguments: {:?}", cli);
    debug!("Resolved configuration: {:?}", config);

    let inventory = inventory::build(&config.root);
    if !inventory.is_complete() {
        warn!(
            "Resolving the {} files found before the scan stopped",
            inventory.file_count()
        );
    }

    let mut disposition = config.disposition();
    let mut report = Report::new(io::stdout().lock());
    let summary = resolver::resolve(&inventory, &mut *disposition, &mut report)?;
    report.summary(&summary)?;

    info!(
        "Program completed in {}",
        format_human_elapsed(start_time.elapsed())
    );
    Ok(())
}
