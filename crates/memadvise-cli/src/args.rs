use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "memadvise",
    version,
    about = "Safely mark cold memory pages in running processes",
    long_about = "Marks cold memory pages in running Linux processes using the \
                  process_madvise syscall. Anonymous, private, writable regions are \
                  selected largest-first until the reclaim budget is reached."
)]
pub struct Cli {
    /// Target PID or comma-separated list of PIDs
    #[arg(short = 't', long = "target", value_name = "PIDS")]
    pub target: String,

    /// Percentage of resident memory to reclaim (out-of-range values fall back to 30)
    #[arg(short = 'p', long, allow_negative_numbers = true)]
    pub percent: Option<i64>,

    /// Reclaim strategy: cold (lazy) or pageout (eager)
    #[arg(short = 'm', long)]
    pub mode: Option<String>,

    /// Print what would be reclaimed without performing the operation
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Print every selected region
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Output results as one JSON object per line
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Maximum number of bytes to reclaim per process, e.g. `4096` or `512MiB`
    #[arg(short = 'b', long, value_name = "SIZE")]
    pub max_bytes: Option<String>,

    /// Path to a `memadvise.toml` config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Merge the bare numeric arguments that follow `-t/--target` into a single
/// comma-separated value, so `memadvise -t $(pidof foo)` works when the shell
/// splits the PID list into separate words.
pub fn preprocess_args(args: Vec<String>) -> Vec<String> {
    if args.len() <= 2 {
        return args;
    }

    let mut processed = Vec::with_capacity(args.len());
    let mut target_index = None;
    let mut pids = Vec::new();
    let mut collecting = false;

    for arg in &args {
        if arg == "-t" || arg == "--target" {
            target_index = Some(processed.len());
            processed.push(arg.clone());
            collecting = true;
            continue;
        }

        if arg.starts_with('-') {
            collecting = false;
            processed.push(arg.clone());
            continue;
        }

        if collecting && arg.parse::<i64>().is_ok() {
            pids.push(arg.as_str());
        } else {
            collecting = false;
            processed.push(arg.clone());
        }
    }

    let Some(target_index) = target_index else {
        return args;
    };
    if pids.is_empty() {
        return args;
    }

    processed.insert(target_index + 1, pids.join(","));
    processed
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PidListError {
    #[error("no PIDs given")]
    Empty,

    #[error("invalid PID '{0}'")]
    Invalid(String),

    #[error("invalid PID '{0}': must be positive")]
    NotPositive(i64),
}

/// Parse a PID list. Comma-separated when the input contains a comma,
/// whitespace-separated otherwise.
pub fn parse_pids(input: &str) -> Result<Vec<i32>, PidListError> {
    let input = input.trim();
    let pieces: Vec<&str> = if input.contains(',') {
        input.split(',').collect()
    } else {
        input.split_whitespace().collect()
    };
    if pieces.is_empty() {
        return Err(PidListError::Empty);
    }

    pieces
        .into_iter()
        .map(|piece| {
            let piece = piece.trim();
            let value: i64 = piece
                .parse()
                .map_err(|_| PidListError::Invalid(piece.to_owned()))?;
            if value <= 0 {
                return Err(PidListError::NotPositive(value));
            }
            i32::try_from(value).map_err(|_| PidListError::Invalid(piece.to_owned()))
        })
        .collect()
}
