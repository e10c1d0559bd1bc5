mod config;
mod export;
mod logging;
mod playlist;
mod ports;
mod preview;
mod stats;
mod tagging;
mod track;

#[cfg(test)]
mod test_utils;

use std::future::Future;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context, eyre::eyre};

use crate::{
    config::{ConfigOverrides, ExporterConfig},
    export::{AlbumExporter, CancellationToken},
    logging::setup_logging,
    playlist::parse_playlist,
    preview::render_preview,
    tagging::TagWriter,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Console log level
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLAYLIST_EXPORTER_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct ExportSettings {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Album name written into every exported file
    #[arg(short, long)]
    album_name: Option<String>,

    /// The .m3u/.m3u8 playlist to export
    #[arg(short, long)]
    playlist: Option<PathBuf>,

    /// The directory to export the album to
    #[arg(short, long)]
    output_directory: Option<PathBuf>,

    /// Keep the original file names instead of prefixing the playlist position
    #[arg(long)]
    no_ordering_prefix: bool,

    /// Album artist written into every exported file
    #[arg(long)]
    album_artist: Option<String>,

    /// Number of tracks copied in parallel
    #[arg(short, long)]
    workers: Option<usize>,
}

impl ExportSettings {
    fn into_config(self) -> Result<ExporterConfig> {
        ExporterConfig::resolve(
            self.config.as_deref(),
            ConfigOverrides {
                album_name: self.album_name,
                playlist_file_path: self.playlist,
                output_directory: self.output_directory,
                no_ordering_prefix: self.no_ordering_prefix,
                album_artist: self.album_artist,
                workers: self.workers,
            },
        )
        .wrap_err("Failed to load exporter config")
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy the playlist's tracks into an album folder and tag them
    Export {
        #[command(flatten)]
        settings: ExportSettings,

        /// Exit with an error if any entry or track could not be exported cleanly
        #[arg(long)]
        strict: bool,
    },
    /// Show what an export would do without copying anything
    Preview {
        #[command(flatten)]
        settings: ExportSettings,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Playlist album exporter starting");

    match args.command {
        Commands::Export { settings, strict } => {
            let config = settings.into_config()?;
            run_export(config, strict).await?;
        }
        Commands::Preview { settings } => {
            let config = settings.into_config()?;
            let playlist = parse_playlist(&config.playlist_file_path)
                .wrap_err("Failed to load playlist")?;
            println!("{}", render_preview(&config, &playlist));
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = ExporterConfig::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match ExporterConfig::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}

async fn run_export(config: ExporterConfig, strict: bool) -> Result<()> {
    log::info!(
        "Exporting playlist {} as album '{}'",
        config.playlist_file_path.display(),
        config.album_name
    );

    let playlist =
        parse_playlist(&config.playlist_file_path).wrap_err("Failed to load playlist")?;
    let load_stats = playlist.stats;

    let exporter = AlbumExporter::new(config.export_options(), TagWriter);
    let cancel = CancellationToken::new();

    let ctrl_c_token = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, ctrl_c_token).await == Interrupt::ForceQuit {
            log::error!("Interrupted again, exiting without waiting for copies");
            std::process::exit(130);
        }
    });

    let export_stats =
        tokio::task::spawn_blocking(move || exporter.export(playlist.tracks, &cancel))
            .await
            .wrap_err("Export task failed")?;
    ctrl_c.abort();

    let stats = load_stats + export_stats;
    println!("{}", stats);

    if stats.is_degraded() {
        log::warn!(
            "Album exported with problems: {} skipped entries, {} failed tracks, {} cancelled",
            stats.skipped_entries,
            stats.failed_tracks(),
            stats.cancelled_tracks
        );
        if strict {
            return Err(eyre!(
                "Export incomplete: {} of {} playlist entries exported",
                stats.exported_tracks,
                stats.total_entries
            ));
        }
    } else {
        log::info!(
            "Album exported successfully to {}",
            config.output_directory.display()
        );
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// The signal source went away; nothing more will arrive.
    Closed,
    /// A second interrupt arrived while copies were still running.
    ForceQuit,
}

/// The first interrupt cancels the export so in-flight copies can finish.
/// The second one asks the caller to quit immediately.
async fn watch_interrupts<S, F>(mut next_interrupt: S, cancel: CancellationToken) -> Interrupt
where
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return Interrupt::Closed;
    }
    log::warn!("Interrupted, finishing copies in progress (press Ctrl-C again to quit now)");
    cancel.cancel();

    match next_interrupt().await {
        Ok(()) => Interrupt::ForceQuit,
        Err(_) => Interrupt::Closed,
    }
}
