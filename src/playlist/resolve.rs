use std::borrow::Cow;
use std::path::{Path, PathBuf};

use url::Url;

/// Outcome of turning a playlist reference into a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The reference already named an absolute local file.
    Absolute(PathBuf),
    /// A bare or relative reference found next to the playlist.
    Repaired(PathBuf),
    Unresolved,
}

fn percent_decode(reference: &str) -> Cow<'_, str> {
    urlencoding::decode(reference).unwrap_or(Cow::Borrowed(reference))
}

fn is_file_uri(reference: &str) -> bool {
    reference
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"))
}

/// `scheme://` prefixes other than `file`. Drive letters and file names
/// containing a colon are not URIs.
fn is_remote_uri(reference: &str) -> bool {
    reference.split_once("://").is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        scheme.len() > 1
            && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn file_uri_to_path(reference: &str) -> Option<PathBuf> {
    let url = Url::parse(reference).ok()?;
    url.to_file_path().ok()
}

/// Resolve a raw playlist reference against the playlist's own directory.
///
/// Absolute references are returned as-is without touching the filesystem.
/// Anything else is looked up beside the playlist, which recovers entries
/// saved with only a file name.
pub fn resolve(raw_reference: &str, playlist_directory: &Path) -> Resolution {
    let reference = raw_reference.trim();
    if reference.is_empty() {
        return Resolution::Unresolved;
    }

    if is_file_uri(reference) {
        return match file_uri_to_path(reference) {
            Some(path) => Resolution::Absolute(path),
            None => {
                log::debug!("Not a local file URI: {}", reference);
                Resolution::Unresolved
            }
        };
    }

    if is_remote_uri(reference) {
        log::debug!("Remote references are not supported: {}", reference);
        return Resolution::Unresolved;
    }

    let decoded = percent_decode(reference);
    let candidate = Path::new(decoded.as_ref());
    if candidate.is_absolute() {
        return Resolution::Absolute(candidate.to_path_buf());
    }

    let joined = playlist_directory.join(candidate);
    let repaired = std::path::absolute(&joined).unwrap_or(joined);
    log::debug!("Repair candidate: {}", repaired.display());

    if repaired.is_file() {
        Resolution::Repaired(repaired)
    } else {
        Resolution::Unresolved
    }
}
