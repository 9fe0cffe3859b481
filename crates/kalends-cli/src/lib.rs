pub mod app;
pub mod cli;
pub mod table;

use std::ffi::OsString;

use clap::Parser;
use tracing::info;

pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let args = cli::CliArgs::parse_from(raw_args);
    cli::init_tracing(args.verbose, args.quiet)?;

    info!(
        verbose = args.verbose,
        quiet = args.quiet,
        "starting kalends CLI"
    );

    app::run(args)
}
