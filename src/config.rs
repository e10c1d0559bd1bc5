use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use serde::{Deserialize, Serialize};

use crate::export::ExportOptions;

const CONFIG_TEMPLATE: &str = r#"# Name written into the album tag of every exported file
album_name = "My Album"

# Extended M3U / M3U8 playlist to export
playlist_file_path = "~/Music/playlists/my-album.m3u8"

# Folder receiving the copied tracks (created if missing)
output_directory = "~/Music/albums/My Album"

# Prefix file names with the playlist position, e.g. "3 - song.mp3"
add_ordering_prefix_to_filename = true

# Optional album artist tag
# album_artist = "Various Artists"

# Number of tracks copied in parallel
workers = 1
"#;

fn default_add_ordering_prefix() -> bool {
    true
}

fn default_workers() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    pub album_name: String,
    pub playlist_file_path: PathBuf,
    pub output_directory: PathBuf,
    #[serde(default = "default_add_ordering_prefix")]
    pub add_ordering_prefix_to_filename: bool,
    #[serde(default)]
    pub album_artist: Option<String>,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub album_name: Option<String>,
    pub playlist_file_path: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub no_ordering_prefix: bool,
    pub album_artist: Option<String>,
    pub workers: Option<usize>,
}

impl ExporterConfig {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ExporterConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config.with_expanded_paths())
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-album-exporter").join("config.toml"))
    }

    /// Build the effective configuration.
    ///
    /// The base is `config_file` when given, otherwise the default config
    /// file if it exists. Without a base every required value must come from
    /// `overrides`.
    pub fn resolve(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let base = match config_file {
            Some(path) => Some(Self::from_file(path)?),
            None => match Self::config_path() {
                Some(path) if path.is_file() => {
                    log::debug!("Using default config file: {}", path.display());
                    Some(Self::from_file(&path)?)
                }
                _ => None,
            },
        };

        let config = Self::merge(base, overrides)?;
        config.validate()?;
        Ok(config)
    }

    fn merge(base: Option<Self>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match base {
            Some(config) => config,
            None => Self {
                album_name: overrides
                    .album_name
                    .clone()
                    .ok_or_else(|| eyre!("No album name given (use --album-name or a config file)"))?,
                playlist_file_path: overrides
                    .playlist_file_path
                    .clone()
                    .ok_or_else(|| eyre!("No playlist given (use --playlist or a config file)"))?,
                output_directory: overrides.output_directory.clone().ok_or_else(|| {
                    eyre!("No output directory given (use --output-directory or a config file)")
                })?,
                add_ordering_prefix_to_filename: default_add_ordering_prefix(),
                album_artist: None,
                workers: default_workers(),
            },
        };

        if let Some(album_name) = overrides.album_name {
            config.album_name = album_name;
        }
        if let Some(playlist) = overrides.playlist_file_path {
            config.playlist_file_path = playlist;
        }
        if let Some(output_directory) = overrides.output_directory {
            config.output_directory = output_directory;
        }
        if overrides.no_ordering_prefix {
            config.add_ordering_prefix_to_filename = false;
        }
        if overrides.album_artist.is_some() {
            config.album_artist = overrides.album_artist;
        }
        if let Some(workers) = overrides.workers {
            config.workers = workers;
        }

        Ok(config.with_expanded_paths())
    }

    /// Reject values the exporter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.album_name.trim().is_empty() {
            return Err(eyre!("album_name must not be empty"));
        }
        if self.playlist_file_path.as_os_str().is_empty() {
            return Err(eyre!("playlist_file_path must not be empty"));
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err(eyre!("output_directory must not be empty"));
        }
        if self.workers == 0 {
            return Err(eyre!("workers must be at least 1"));
        }
        Ok(())
    }

    /// Write a commented template to the default location, if none exists.
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| eyre!("No config directory on this system"))?;
        if path.exists() {
            log::info!("Config file already exists: {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            output_directory: self.output_directory.clone(),
            album_name: self.album_name.clone(),
            album_artist: self.album_artist.clone(),
            add_ordering_prefix: self.add_ordering_prefix_to_filename,
            workers: self.workers,
        }
    }

    fn with_expanded_paths(mut self) -> Self {
        self.playlist_file_path = expand_path(&self.playlist_file_path);
        self.output_directory = expand_path(&self.output_directory);
        self
    }
}

/// Expand ~ to home directory
fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
