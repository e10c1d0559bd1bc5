use std::fmt::Write;

use crate::config::ExporterConfig;
use crate::playlist::ParsedPlaylist;
use crate::track::format_duration;

/// Describe what an export would do, without touching the output directory.
pub fn render_preview(config: &ExporterConfig, playlist: &ParsedPlaylist) -> String {
    let mut out = String::new();
    let total_seconds: u32 = playlist
        .tracks
        .iter()
        .filter_map(|track| track.duration())
        .fold(0, u32::saturating_add);

    let _ = writeln!(out, "Album:    {}", config.album_name);
    if let Some(album_artist) = &config.album_artist {
        let _ = writeln!(out, "Artist:   {}", album_artist);
    }
    let _ = writeln!(out, "Playlist: {}", config.playlist_file_path.display());
    let _ = writeln!(out, "Output:   {}", config.output_directory.display());
    let _ = writeln!(
        out,
        "Tracks:   {} ({})",
        playlist.tracks.len(),
        format_duration(Some(total_seconds))
    );
    let _ = writeln!(out);

    for track in &playlist.tracks {
        let _ = writeln!(
            out,
            "{:>4}  {}  {}",
            track.order(),
            format_duration(track.duration()),
            track.destination_file_name(config.add_ordering_prefix_to_filename)
        );
        if !track.title().is_empty() {
            let _ = writeln!(out, "      title:  {}", track.title());
        }
        let _ = writeln!(out, "      source: {}", track.source_path().display());
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", playlist.stats);
    out
}
