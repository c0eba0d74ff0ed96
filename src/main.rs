use anyhow::{bail, Context, Result};
use std::env;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod dispatch;
mod input;
mod presets;
mod runner;

use input::HookInput;
use runner::SystemRunner;

/// Environment variable holding the tracing filter (logging is off by default)
const LOG_ENV: &str = "LINTGATE_LOG";

const USAGE: &str = "\
Usage: lintgate [PROFILE]

Reads a PostToolUse hook event on stdin, then runs the matching profile's
fix and format tools on the edited file.

With PROFILE, only that profile is considered. Without it, the first
profile whose extensions match the file is used.

Exit status: 0 nothing to do or clean, 2 lint issues (reported on stderr).
";

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
enum Args {
    Help,
    Run { profile: Option<String> },
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut profile = None;

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Args::Help),
            a if a.starts_with('-') => bail!("Unknown option: {}\n\n{}", a, USAGE),
            a => {
                if profile.is_some() {
                    bail!("Unexpected argument: {}\n\n{}", a, USAGE);
                }
                profile = Some(a.to_string());
            }
        }
    }

    Ok(Args::Run { profile })
}

fn init_logging() {
    // Logs share stderr with the lint report, so stay quiet unless asked
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let profile = match parse_args(&args)? {
        Args::Help => {
            io::stdout().write_all(USAGE.as_bytes())?;
            return Ok(ExitCode::SUCCESS);
        }
        Args::Run { profile } => profile,
    };

    let input = read_input()?;
    debug!(
        event = input.hook_event_name.as_deref().unwrap_or("unknown"),
        tool = input.tool_name.as_deref().unwrap_or("unknown"),
        session = input.session_id.as_deref().unwrap_or("unknown"),
        "hook event received"
    );

    let cwd = resolve_cwd(&input)?;
    let loaded = config::load_for_dir(&cwd)?;
    match &loaded.source {
        Some(path) => debug!(config = %path.display(), "loaded config"),
        None => debug!("no config file, using built-in presets"),
    }

    let profiles = loaded.config.eligible(profile.as_deref())?;
    let outcome = dispatch::dispatch(&input, &profiles, &cwd, &SystemRunner)?;
    debug!(?outcome, "dispatch finished");

    if let Some(report) = outcome.report() {
        io::stderr().write_all(report.as_bytes())?;
    }

    Ok(ExitCode::from(outcome.exit_code()))
}

fn read_input() -> Result<HookInput> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read hook input from stdin")?;
    HookInput::parse(&buffer)
}

/// Directory for relative paths, config lookup, and tool runs:
/// the event's cwd if it has one, else the process working directory
fn resolve_cwd(input: &HookInput) -> Result<PathBuf> {
    let process_cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(match input.cwd.as_deref() {
        Some(cwd) if !cwd.is_empty() => process_cwd.join(cwd),
        _ => process_cwd,
    })
}
