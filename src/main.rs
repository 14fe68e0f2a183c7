use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wayland_color_picker::clipboard;
use wayland_color_picker::config::{BackendChoice, Config, Paths};
use wayland_color_picker::history::{render_row, ColorHistory, HistoryEntry};
use wayland_color_picker::{ColorSample, NoColorPicked, Picker};

/// Pick the color of a pixel anywhere on screen.
#[derive(Parser)]
#[command(name = "wayland-color-picker", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    pick: PickArgs,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Pick a color (the default)
    Pick(PickArgs),
    /// List previously picked colors, newest first
    History {
        /// Print the raw JSON records
        #[arg(long)]
        json: bool,
    },
    /// Forget every picked color
    ClearHistory,
    /// Own the clipboard selection until another application replaces it
    #[command(name = clipboard::SERVE_SUBCOMMAND, hide = true)]
    ServeClipboard { text: String },
}

#[derive(Args, Clone)]
struct PickArgs {
    /// How to print the picked color
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Hex)]
    format: OutputFormat,

    /// Do not copy the color to the clipboard
    #[arg(long)]
    no_copy: bool,

    /// Do not record the color in the history
    #[arg(long)]
    no_history: bool,

    /// Restrict picking to one backend
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Seconds to wait for the desktop portal to answer
    #[arg(long, value_name = "SECS")]
    portal_timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Hex,
    Rgb,
    Hsl,
    Hsv,
    Json,
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Some(Command::ServeClipboard { text }) = &cli.command {
        clipboard::serve(text)?;
        return Ok(ExitCode::SUCCESS);
    }

    let paths = Paths::resolve(cli.config);
    let config = Config::load(&paths.config)
        .with_context(|| format!("loading {}", paths.config.display()))?;

    match cli.command {
        Some(Command::Pick(args)) => pick(config, &paths, args).await,
        None => pick(config, &paths, cli.pick).await,
        Some(Command::History { json }) => show_history(&config, &paths, json),
        Some(Command::ClearHistory) => clear_history(&config, &paths),
        Some(Command::ServeClipboard { .. }) => Ok(ExitCode::SUCCESS),
    }
}

async fn pick(mut config: Config, paths: &Paths, args: PickArgs) -> anyhow::Result<ExitCode> {
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(secs) = args.portal_timeout {
        config.portal_timeout_secs = secs;
    }

    let cancel = CancellationToken::new();
    let picker = Picker::from_env(&config, cancel.clone());

    // The chain blocks on interactive tools; keep it off the async thread.
    let mut task = tokio::task::spawn_blocking(move || picker.pick());
    let result = tokio::select! {
        joined = &mut task => joined.context("picker thread panicked")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, abandoning pick");
            cancel.cancel();
            task.await.context("picker thread panicked")?
        }
    };

    let color = match result {
        Ok(color) => color,
        Err(NoColorPicked) => {
            eprintln!("Color picking cancelled or failed");
            return Ok(ExitCode::FAILURE);
        }
    };

    let entry = HistoryEntry::now(color);
    println!("{}", render_color(color, &entry, args.format)?);

    if !args.no_history {
        let mut history = ColorHistory::load(paths.history_to_read(), config.history_limit);
        if history.record(entry.clone()) {
            if let Err(err) = history.save(&paths.history) {
                tracing::warn!(path = %paths.history.display(), %err, "saving history failed");
            }
        }
    }

    if config.autocopy && !args.no_copy {
        match clipboard::copy_text(&entry.color) {
            Ok(()) => tracing::info!(color = %entry.color, "copied to clipboard"),
            Err(err) => {
                tracing::warn!(%err, "copying to clipboard failed");
                eprintln!("Could not copy {} to the clipboard: {err}", entry.color);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn render_color(
    color: ColorSample,
    entry: &HistoryEntry,
    format: OutputFormat,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Hex => color.to_hex(),
        OutputFormat::Rgb => color.to_rgb_string(),
        OutputFormat::Hsl => color.to_hsl_string(),
        OutputFormat::Hsv => color.to_hsv_string(),
        OutputFormat::Json => serde_json::to_string(entry)?,
    })
}

fn show_history(config: &Config, paths: &Paths, json: bool) -> anyhow::Result<ExitCode> {
    let history = ColorHistory::load(paths.history_to_read(), config.history_limit);

    if json {
        println!("{}", serde_json::to_string_pretty(history.entries())?);
    } else if history.is_empty() {
        println!("No colors picked yet");
    } else {
        for row in history.rows() {
            println!("{}", render_row(&row));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn clear_history(config: &Config, paths: &Paths) -> anyhow::Result<ExitCode> {
    let mut history = ColorHistory::load(paths.history_to_read(), config.history_limit);
    history.clear();
    history
        .save(&paths.history)
        .with_context(|| format!("writing {}", paths.history.display()))?;
    Ok(ExitCode::SUCCESS)
}
