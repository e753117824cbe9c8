use anyhow::{Context, Result};
use clap::Parser;
use memadvise_cli::args::{parse_pids, preprocess_args, Cli};
use memadvise_cli::output::OutputManager;
use memadvise_cli::pipeline::{Reclaimer, RunOptions};
use memadvise_config::{init_tracing, load_config};
use memadvise_memory::parse_byte_size;
use memadvise_process::AdviceMode;

fn main() {
    let cli = Cli::parse_from(preprocess_args(std::env::args().collect()));
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let (config, config_path) = load_config(cli.config.as_deref(), &cwd)?;
    init_tracing(&config.logging);
    if let Some(path) = &config_path {
        tracing::debug!(target: "memadvise.cli", path = %path.display(), "loaded config");
    }

    let pids = parse_pids(&cli.target).context("invalid target PIDs")?;
    let mode: AdviceMode = cli
        .mode
        .as_deref()
        .unwrap_or(config.reclaim.mode.as_str())
        .parse()?;
    let max_bytes = match cli.max_bytes.as_deref() {
        Some(raw) => parse_byte_size(raw)
            .map_err(anyhow::Error::msg)
            .context("invalid --max-bytes")?,
        None => config.reclaim.max_bytes.0,
    };

    let options = RunOptions {
        percent: cli.percent.unwrap_or(config.reclaim.percent),
        mode,
        max_bytes,
        dry_run: cli.dry_run,
    };

    let mut output = OutputManager::new(cli.verbose, cli.json);
    let status = Reclaimer::new(options).run(&pids, &mut output)?;
    Ok(status.exit_code())
}
