mod m3u;
mod resolve;

use std::fs;
use std::path::{Path, PathBuf};

use crate::stats::ExportStats;
use crate::track::Track;

pub use m3u::M3uSyntaxError;
pub use resolve::{Resolution, resolve};

/// Failures that leave nothing to export.
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("Failed to read playlist {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Playlist {} is not UTF-8 text", .path.display())]
    NotUtf8 { path: PathBuf },

    #[error("Playlist {} is malformed: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: M3uSyntaxError,
    },
}

/// Tracks in playlist order together with the load-time counters.
#[derive(Debug)]
pub struct ParsedPlaylist {
    pub tracks: Vec<Track>,
    pub stats: ExportStats,
}

/// Load a playlist and resolve every entry to a local file.
///
/// Each entry keeps the 1-based position it has in the file as its order,
/// so entries that cannot be resolved leave a gap in the numbering instead
/// of shifting the tracks after them.
pub fn parse_playlist(playlist_path: &Path) -> Result<ParsedPlaylist, PlaylistError> {
    log::info!("Loading playlist from {}", playlist_path.display());

    let playlist_path =
        std::path::absolute(playlist_path).unwrap_or_else(|_| playlist_path.to_path_buf());

    let bytes = fs::read(&playlist_path).map_err(|source| PlaylistError::Read {
        path: playlist_path.clone(),
        source,
    })?;
    let contents = String::from_utf8(bytes).map_err(|_| PlaylistError::NotUtf8 {
        path: playlist_path.clone(),
    })?;
    let entries = m3u::parse_entries(&contents).map_err(|source| PlaylistError::Syntax {
        path: playlist_path.clone(),
        source,
    })?;

    let playlist_directory = playlist_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut stats = ExportStats::zero();
    let mut tracks = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        stats.total_entries += 1;
        let order = index + 1;

        let source_path = match resolve(&entry.reference, &playlist_directory) {
            Resolution::Absolute(path) => path,
            Resolution::Repaired(path) => {
                log::info!(
                    "Repaired entry {} ('{}'): {} -> {}",
                    order,
                    entry.title,
                    entry.reference,
                    path.display()
                );
                stats.repaired_references += 1;
                path
            }
            Resolution::Unresolved => {
                log::error!(
                    "Skipping entry {} ('{}') on line {}: cannot resolve {}",
                    order,
                    entry.title,
                    entry.line,
                    entry.reference
                );
                stats.skipped_entries += 1;
                continue;
            }
        };

        tracks.push(Track::new(source_path, order, entry.title, entry.duration));
    }

    stats.loaded_tracks = tracks.len();
    log::info!(
        "Loaded {} of {} playlist entries ({} repaired, {} skipped)",
        stats.loaded_tracks,
        stats.total_entries,
        stats.repaired_references,
        stats.skipped_entries
    );

    Ok(ParsedPlaylist { tracks, stats })
}
