use clap::Parser;
use log::LevelFilter;

mod app;
mod cli;

use cli::{Args, CliError};

fn main() {
    match rdstool() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn rdstool() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    app::run(&args).map_err(CliError::from)
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("rdsgroup", log_filter)
            .filter_module("rdstool", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}
