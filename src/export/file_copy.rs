use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::Path;

/// Copy `source` to `destination`, carrying over permissions and the
/// modification and access times.
///
/// Failing to restore the timestamps does not fail the copy.
pub fn copy_preserving_times(source: &Path, destination: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, destination)?;

    if let Err(e) = restore_times(source, destination) {
        log::warn!(
            "Copied {} but could not keep its timestamps: {}",
            destination.display(),
            e
        );
    }

    Ok(bytes)
}

fn restore_times(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;

    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    OpenOptions::new()
        .write(true)
        .open(destination)?
        .set_times(times)
}
