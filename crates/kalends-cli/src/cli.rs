use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kal",
    version,
    about = "kalends: calendar grids with events in your terminal",
    arg_required_else_help = false
)]
pub struct CliArgs {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Events file (a JSON array of records). Falls back to
    /// $KALENDS_EVENTS, then ~/.kalends/events.json.
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Month to open on, e.g. 2024-03-01, "march", or "today".
    #[arg(long = "month")]
    pub month: Option<String>,

    /// Show an N-day interval instead of a month.
    #[arg(long = "days", conflicts_with = "months")]
    pub days: Option<u32>,

    /// Show N months at once.
    #[arg(long = "months")]
    pub months: Option<u32>,

    /// How many days/months a navigation step covers.
    #[arg(long = "interval", default_value_t = 1)]
    pub interval: u32,

    /// Explicit interval start for --days/--months modes.
    #[arg(long = "start")]
    pub start: Option<String>,

    /// First day of the week: 0 is Sunday, 1 is Monday.
    #[arg(long = "week-offset", default_value_t = 0)]
    pub week_offset: u32,

    /// Pad every month out to six rows.
    #[arg(long = "force-six-rows")]
    pub force_six_rows: bool,

    /// Render blank filler instead of adjacent-month days.
    #[arg(long = "hide-adjacent")]
    pub hide_adjacent: bool,

    /// Earliest navigable date.
    #[arg(long = "constraint-start")]
    pub constraint_start: Option<String>,

    /// Latest navigable date.
    #[arg(long = "constraint-end")]
    pub constraint_end: Option<String>,

    /// Date to mark as selected.
    #[arg(long = "selected")]
    pub selected: Option<String>,

    /// Advance N periods after opening (negative moves backward).
    #[arg(long = "advance", default_value_t = 0, allow_hyphen_values = true)]
    pub advance: i32,

    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
