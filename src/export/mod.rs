mod cancellation;
mod file_copy;

use std::fs;
use std::ops::Add;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::ports::metadata::{MetadataError, MetadataWriter};
use crate::stats::ExportStats;
use crate::track::Track;

pub use cancellation::CancellationToken;
use file_copy::copy_preserving_times;

/// Settings the exporter needs from the loaded configuration.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_directory: PathBuf,
    pub album_name: String,
    pub album_artist: Option<String>,
    pub add_ordering_prefix: bool,
    /// Number of tracks copied at the same time. 0 and 1 both mean sequential.
    pub workers: usize,
}

/// Copies resolved tracks into the album folder and tags the copies.
///
/// A failing track never stops the export: every problem is logged, counted
/// and the next track is processed.
pub struct AlbumExporter<W: MetadataWriter> {
    options: ExportOptions,
    writer: W,
}

impl<W: MetadataWriter> AlbumExporter<W> {
    pub fn new(options: ExportOptions, writer: W) -> Self {
        Self { options, writer }
    }

    pub fn export(&self, tracks: Vec<Track>, cancel: &CancellationToken) -> ExportStats {
        let output_directory = &self.options.output_directory;
        log::info!(
            "Exporting {} tracks as album '{}' to {}",
            tracks.len(),
            self.options.album_name,
            output_directory.display()
        );

        // Created once, before any worker starts. Copies into a missing
        // directory fail and are counted like any other copy error.
        if let Err(e) = fs::create_dir_all(output_directory) {
            log::error!(
                "Failed to create output directory {}: {}",
                output_directory.display(),
                e
            );
        }

        let stats = if self.options.workers <= 1 {
            self.export_sequential(&tracks, cancel)
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.workers)
                .thread_name(|index| format!("album-export-{}", index))
                .build()
            {
                Ok(pool) => pool.install(|| {
                    tracks
                        .par_iter()
                        .map(|track| self.export_track(track, cancel))
                        .reduce(ExportStats::zero, Add::add)
                }),
                Err(e) => {
                    log::warn!("Failed to start export workers, copying sequentially: {}", e);
                    self.export_sequential(&tracks, cancel)
                }
            }
        };

        log::info!(
            "Export finished: {} exported, {} not found, {} copy errors, {} metadata errors, {} cancelled",
            stats.exported_tracks,
            stats.file_not_found_tracks,
            stats.copy_error_tracks,
            stats.metadata_error_tracks,
            stats.cancelled_tracks
        );
        stats
    }

    fn export_sequential(&self, tracks: &[Track], cancel: &CancellationToken) -> ExportStats {
        tracks
            .iter()
            .map(|track| self.export_track(track, cancel))
            .sum()
    }

    fn export_track(&self, track: &Track, cancel: &CancellationToken) -> ExportStats {
        let mut stats = ExportStats::zero();

        if cancel.is_cancelled() {
            log::warn!(
                "Export cancelled, not starting track {} ('{}')",
                track.order(),
                track.title()
            );
            stats.cancelled_tracks += 1;
            return stats;
        }

        let source = track.source_path();
        if !source.exists() {
            log::error!(
                "Track {} ('{}') not found, skipping: {}",
                track.order(),
                track.title(),
                source.display()
            );
            stats.file_not_found_tracks += 1;
            return stats;
        }

        let destination = self
            .options
            .output_directory
            .join(track.destination_file_name(self.options.add_ordering_prefix));

        log::debug!(
            "Copying track {} ({}) from {} to {}",
            track.order(),
            track.file_name(),
            source.display(),
            destination.display()
        );
        if let Err(e) = copy_preserving_times(source, &destination) {
            log::error!(
                "Failed to copy track {} ('{}') from {} to {}: {}",
                track.order(),
                track.title(),
                source.display(),
                destination.display(),
                e
            );
            stats.copy_error_tracks += 1;
            return stats;
        }
        stats.exported_tracks += 1;

        if let Err(e) = self.tag(&destination, track) {
            log::warn!(
                "Exported track {} ('{}') but could not tag {}: {}",
                track.order(),
                track.title(),
                destination.display(),
                e
            );
            stats.metadata_error_tracks += 1;
        }

        stats
    }

    fn tag(&self, destination: &Path, track: &Track) -> Result<(), MetadataError> {
        self.writer.set_album(destination, &self.options.album_name)?;
        self.writer.set_track_number(destination, track.order())?;
        if let Some(album_artist) = &self.options.album_artist {
            self.writer.set_album_artist(destination, album_artist)?;
        }
        Ok(())
    }
}
