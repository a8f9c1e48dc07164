//! Tailwatch - follow the tail of a file and the output of a supervised process.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tailwatch::config::{ConfigError, ConfigLoader, ConfigSource, TailwatchConfig};
use tailwatch::display;
use tailwatch::process::{ProcessError, ProcessRunner};
use tailwatch::tailer::{TailError, TailState, TailStats, Tailer};

#[derive(Parser)]
#[command(
    name = "tailwatch",
    about = "Follow the tail of a file and the output of a supervised process",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a config file (defaults to .tailwatch.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the last lines of a file.
    Tail {
        /// The file to read.
        path: PathBuf,
        /// Number of trailing lines to show.
        #[arg(short = 'n', long)]
        max_lines: Option<i64>,
        /// Keep printing new lines as the file changes.
        #[arg(short, long)]
        follow: bool,
        /// Seconds between checks when following.
        #[arg(short, long)]
        interval: Option<f64>,
        /// Do not prefix lines with line numbers.
        #[arg(long)]
        no_line_numbers: bool,
    },
    /// Run a command and follow its combined output.
    Run {
        /// The command to execute.
        command: String,
        /// Exec the command directly instead of through the shell.
        #[arg(long)]
        no_shell: bool,
        /// Number of trailing lines to keep.
        #[arg(short = 'n', long)]
        max_lines: Option<i64>,
        /// Seconds between output checks.
        #[arg(short, long)]
        interval: Option<f64>,
        /// Do not prefix lines with line numbers.
        #[arg(long)]
        no_line_numbers: bool,
        /// Print the final status as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tail(#[from] TailError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("Failed to encode status: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolved options shared by both subcommands.
struct FollowOptions {
    max_lines: i64,
    interval: Duration,
    line_numbers: bool,
}

impl FollowOptions {
    fn resolve(
        config: &TailwatchConfig,
        max_lines: Option<i64>,
        interval: Option<f64>,
        no_line_numbers: bool,
    ) -> Self {
        let mut tail = config.tail.clone();
        if let Some(secs) = interval {
            tail.refresh_interval_secs = secs;
        }
        Self {
            max_lines: max_lines.unwrap_or(tail.max_lines),
            interval: tail.refresh_interval(),
            line_numbers: tail.show_line_numbers && !no_line_numbers,
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Print lines numbered above `printed`, returning the new high-water mark.
///
/// A file that shrank below `printed` is treated as rewritten and shown again.
fn print_new_lines(state: &TailState, printed: usize, line_numbers: bool) -> usize {
    let printed = if state.total_lines() < printed { 0 } else { printed };
    for (number, line) in state.numbered_lines().filter(|(n, _)| *n > printed) {
        if line_numbers {
            println!("{number:4} | {line}");
        } else {
            println!("{line}");
        }
    }
    state.total_lines().max(printed)
}

async fn tail(path: PathBuf, options: &FollowOptions, follow: bool) -> Result<(), AppError> {
    let tailer = Tailer::new();
    let mut state = TailState::new(path);

    tailer.read(&mut state, options.max_lines).await?;
    display::print_file_info(&state);
    display::print_lines(&state, options.line_numbers);
    if !follow {
        return Ok(());
    }

    let mut printed = state.total_lines();
    let mut last_error: Option<String> = None;
    let mut ticker = tokio::time::interval(options.interval);
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                match tailer.read(&mut state, options.max_lines).await {
                    Ok(_) => {
                        last_error = None;
                        printed = print_new_lines(&state, printed, options.line_numbers);
                    }
                    Err(e) => {
                        let message = e.to_string();
                        if last_error.as_deref() != Some(message.as_str()) {
                            display::print_error(&message);
                        }
                        last_error = Some(message);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn run(
    command: &str,
    shell: bool,
    options: &FollowOptions,
    json: bool,
    config: &TailwatchConfig,
) -> Result<(), AppError> {
    let mut runner = ProcessRunner::with_config(&config.process);
    let status = runner.spawn(command, shell)?;
    display::print_status(&status);

    let Some(output) = runner.output_path().map(Path::to_path_buf) else {
        return Ok(());
    };
    tracing::info!(output = %output.display(), "Following process output");

    let tailer = Tailer::new();
    let mut state = TailState::new(output);
    let mut printed = 0;
    let mut ticker = tokio::time::interval(options.interval);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                if let Err(e) = runner.stop().await {
                    display::print_error(&e.to_string());
                }
                break;
            }
            _ = ticker.tick() => {
                let running = runner.is_running();
                match tailer.read(&mut state, options.max_lines).await {
                    Ok(_) => printed = print_new_lines(&state, printed, options.line_numbers),
                    Err(e) => display::print_error(&e.to_string()),
                }
                if !running {
                    break;
                }
            }
        }
    }

    if tailer.read(&mut state, options.max_lines).await.is_ok() {
        print_new_lines(&state, printed, options.line_numbers);
    }

    let status = runner.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        display::print_status(&status);
    }
    display::print_stats(&TailStats::from_lines(state.lines()));

    runner.cleanup().await;
    Ok(())
}

async fn dispatch(command: Commands, config: &TailwatchConfig) -> Result<(), AppError> {
    match command {
        Commands::Tail {
            path,
            max_lines,
            follow,
            interval,
            no_line_numbers,
        } => {
            let options = FollowOptions::resolve(config, max_lines, interval, no_line_numbers);
            tail(path, &options, follow).await
        }
        Commands::Run {
            command,
            no_shell,
            max_lines,
            interval,
            no_line_numbers,
            json,
        } => {
            let options = FollowOptions::resolve(config, max_lines, interval, no_line_numbers);
            let shell = config.process.shell && !no_shell;
            run(&command, shell, &options, json, config).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = cli.config.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let result = match loader.load() {
        Ok((config, source)) => {
            if let ConfigSource::File(path) = &source {
                tracing::info!(path = %path.display(), "Using config file");
            }
            dispatch(cli.command, &config).await
        }
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
