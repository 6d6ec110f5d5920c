use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use volcano_valves::{best_plan, Error, Volcano, MINUTES};

#[derive(Parser)]
#[command(name = "day16")]
#[command(about = "Find the most pressure that can be released before the volcano erupts")]
struct Cli {
    /// Log parsing and search progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the most pressure that can be released
    Part1 {
        /// Read valves from this file instead of stdin
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
    },
    /// Print the moves that release the most pressure, one per minute
    Plan {
        /// Read valves from this file instead of stdin
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Part1 { input } => read_input(input)
            .and_then(|s| part1(&s))
            .map(|pressure| println!("pressure released: {pressure}")),
        Command::Plan { input } => read_input(input).and_then(|s| plan(&s)).map(|lines| {
            for line in lines {
                println!("{line}");
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("day16: {err}");
            ExitCode::FAILURE
        },
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<PathBuf>) -> Result<String, Error> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(io::read_to_string(io::stdin().lock())?),
    }
}

fn part1(input: &str) -> Result<u64, Error> {
    let volcano = Volcano::from_str(input)?;
    Ok(best_plan(&volcano, MINUTES)?.pressure)
}

fn plan(input: &str) -> Result<Vec<String>, Error> {
    let volcano = Volcano::from_str(input)?;
    let plan = best_plan(&volcano, MINUTES)?;
    let actions = plan.actions(&volcano)?;

    // Double check the route against a minute-by-minute replay.
    let replayed = actions.pressure(&volcano, MINUTES)?;
    if replayed != plan.pressure {
        tracing::warn!(replayed, planned = plan.pressure, "replayed pressure differs from plan");
    }

    let mut lines: Vec<String> = actions
        .describe(&volcano)
        .into_iter()
        .enumerate()
        .map(|(i, action)| format!("minute {}: {action}", i + 1))
        .collect();
    lines.push(format!("pressure released: {}", plan.pressure));
    Ok(lines)
}
