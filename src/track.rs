use std::path::{Path, PathBuf};

/// A playlist entry that resolved to a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    source_path: PathBuf,
    file_name: String,
    order: usize,
    title: String,
    duration: Option<u32>,
}

impl Track {
    /// `order` is the 1-based position of the entry in the playlist file.
    pub fn new(source_path: PathBuf, order: usize, title: String, duration: Option<u32>) -> Self {
        let file_name = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source_path,
            file_name,
            order,
            title,
            duration,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Duration in whole seconds, if the playlist knew it.
    pub fn duration(&self) -> Option<u32> {
        self.duration
    }

    /// File name used inside the album folder.
    pub fn destination_file_name(&self, add_ordering_prefix: bool) -> String {
        if add_ordering_prefix {
            format!("{} - {}", self.order, self.file_name)
        } else {
            self.file_name.clone()
        }
    }
}

/// Format a duration as `hh:mm:ss`.
pub fn format_duration(seconds: Option<u32>) -> String {
    match seconds {
        Some(seconds) => {
            let hours = seconds / 3600;
            let minutes = (seconds % 3600) / 60;
            let remaining_seconds = seconds % 60;
            format!("{:02}:{:02}:{:02}", hours, minutes, remaining_seconds)
        }
        None => "--:--:--".to_string(),
    }
}
