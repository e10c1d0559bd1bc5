use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Counters collected while loading a playlist and exporting its tracks.
///
/// Parsing and exporting each start from [`ExportStats::zero`] and only ever
/// increment their own instance. The two phases are merged with `+`, which is
/// associative and commutative, so per-worker partials can be reduced in any
/// order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub total_entries: usize,
    pub repaired_references: usize,
    pub skipped_entries: usize,
    pub loaded_tracks: usize,
    pub file_not_found_tracks: usize,
    pub copy_error_tracks: usize,
    pub metadata_error_tracks: usize,
    pub exported_tracks: usize,
    /// Tracks never started because the export was cancelled.
    pub cancelled_tracks: usize,
}

impl ExportStats {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Tracks that were loaded but did not make it into the album folder,
    /// plus tracks that made it but could not be tagged.
    pub fn failed_tracks(&self) -> usize {
        self.file_not_found_tracks + self.copy_error_tracks + self.metadata_error_tracks
    }

    /// Whether anything went wrong between reading the playlist and tagging
    /// the last file.
    pub fn is_degraded(&self) -> bool {
        self.skipped_entries > 0 || self.cancelled_tracks > 0 || self.failed_tracks() > 0
    }
}

impl Add for ExportStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            total_entries: self.total_entries + other.total_entries,
            repaired_references: self.repaired_references + other.repaired_references,
            skipped_entries: self.skipped_entries + other.skipped_entries,
            loaded_tracks: self.loaded_tracks + other.loaded_tracks,
            file_not_found_tracks: self.file_not_found_tracks + other.file_not_found_tracks,
            copy_error_tracks: self.copy_error_tracks + other.copy_error_tracks,
            metadata_error_tracks: self.metadata_error_tracks + other.metadata_error_tracks,
            exported_tracks: self.exported_tracks + other.exported_tracks,
            cancelled_tracks: self.cancelled_tracks + other.cancelled_tracks,
        }
    }
}

impl AddAssign for ExportStats {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for ExportStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl fmt::Display for ExportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total entries:          {}", self.total_entries)?;
        writeln!(f, "repaired references:    {}", self.repaired_references)?;
        writeln!(f, "skipped entries:        {}", self.skipped_entries)?;
        writeln!(f, "loaded tracks:          {}", self.loaded_tracks)?;
        writeln!(f, "file not found tracks:  {}", self.file_not_found_tracks)?;
        writeln!(f, "copy error tracks:      {}", self.copy_error_tracks)?;
        writeln!(f, "metadata error tracks:  {}", self.metadata_error_tracks)?;
        writeln!(f, "cancelled tracks:       {}", self.cancelled_tracks)?;
        write!(f, "exported tracks:        {}", self.exported_tracks)
    }
}
