use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

pub struct PlaylistEntry {
    pub title: String,
    pub reference: String,
    pub duration: i64,
}

impl PlaylistEntry {
    pub fn new(title: &str, reference: &str, duration: i64) -> Self {
        Self {
            title: title.to_string(),
            reference: reference.to_string(),
            duration,
        }
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents)
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
    path
}

/// Write an extended M3U playlist with one `#EXTINF` per entry.
pub fn write_playlist(dir: &Path, name: &str, entries: &[PlaylistEntry]) -> PathBuf {
    let mut contents = String::from("#EXTM3U\n");
    for entry in entries {
        contents.push_str(&format!("#EXTINF:{},{}\n", entry.duration, entry.title));
        contents.push_str(&entry.reference);
        contents.push('\n');
    }
    write_file(dir, name, contents.as_bytes())
}

pub fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .unwrap_or_else(|_| panic!("Not an absolute path: {}", path.display()))
        .to_string()
}
