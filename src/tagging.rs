use std::fmt;
use std::path::Path;

use audiotags::{AudioTag, Id3v2Tag, Tag, TagType};
use lofty::config::WriteOptions;
use lofty::prelude::{Accessor, ItemKey, TagExt, TaggedFileExt};

use crate::ports::metadata::{MetadataError, MetadataWriter};

/// Audio containers we know how to tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Mp4,
    Wav,
}

impl AudioFormat {
    pub fn from_path(path: &Path) -> Result<Self, MetadataError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "mp3" => Ok(Self::Mp3),
            "flac" => Ok(Self::Flac),
            "m4a" | "m4b" | "mp4" => Ok(Self::Mp4),
            "wav" => Ok(Self::Wav),
            _ => Err(MetadataError::UnsupportedFormat { extension }),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mp3 => "MP3",
            Self::Flac => "FLAC",
            Self::Mp4 => "MP4",
            Self::Wav => "WAV",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
enum TagEdit<'a> {
    Album(&'a str),
    TrackNumber(usize),
    AlbumArtist(&'a str),
}

impl fmt::Display for TagEdit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Album(album) => write!(f, "album '{}'", album),
            Self::TrackNumber(number) => write!(f, "track number {}", number),
            Self::AlbumArtist(artist) => write!(f, "album artist '{}'", artist),
        }
    }
}

fn tagging_error(operation: &'static str, path: &Path, reason: impl fmt::Display) -> MetadataError {
    MetadataError::Tagging {
        operation,
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Writes tags in place, picking the backend from the file extension.
///
/// MP3, FLAC and MP4 go through `audiotags`; WAV goes through `lofty`, which
/// handles the RIFF container.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagWriter;

impl TagWriter {
    fn apply(&self, path: &Path, edit: TagEdit<'_>) -> Result<(), MetadataError> {
        let format = AudioFormat::from_path(path)?;
        log::debug!("Setting {} on {} file {}", edit, format, path.display());

        match format {
            AudioFormat::Mp3 | AudioFormat::Flac | AudioFormat::Mp4 => {
                write_with_audiotags(path, format, edit)?
            }
            AudioFormat::Wav => write_with_lofty(path, edit)?,
        }

        log::debug!("Successfully set {} on {}", edit, path.display());
        Ok(())
    }
}

impl MetadataWriter for TagWriter {
    fn set_album(&self, path: &Path, album: &str) -> Result<(), MetadataError> {
        self.apply(path, TagEdit::Album(album))
    }

    fn set_track_number(&self, path: &Path, track_number: usize) -> Result<(), MetadataError> {
        self.apply(path, TagEdit::TrackNumber(track_number))
    }

    fn set_album_artist(&self, path: &Path, album_artist: &str) -> Result<(), MetadataError> {
        self.apply(path, TagEdit::AlbumArtist(album_artist))
    }
}

fn write_with_audiotags(
    path: &Path,
    format: AudioFormat,
    edit: TagEdit<'_>,
) -> Result<(), MetadataError> {
    let tag_type = match format {
        AudioFormat::Mp3 => TagType::Id3v2,
        AudioFormat::Flac => TagType::Flac,
        _ => TagType::Mp4,
    };

    let reader = Tag::new().with_tag_type(tag_type);
    let mut tag: Box<dyn AudioTag> = match reader.read_from_path(path) {
        Ok(tag) => tag,
        // Untagged MP3s are common; start an empty ID3v2 tag for them.
        Err(e) if format == AudioFormat::Mp3 => {
            log::debug!("No ID3 tag in {} ({}), creating one", path.display(), e);
            Box::new(Id3v2Tag::new())
        }
        Err(e) => return Err(tagging_error("read", path, e)),
    };

    match edit {
        TagEdit::Album(album) => tag.set_album_title(album),
        TagEdit::TrackNumber(number) => {
            let number =
                u16::try_from(number).map_err(|_| MetadataError::TrackNumberOutOfRange(number))?;
            tag.set_track_number(number);
        }
        TagEdit::AlbumArtist(artist) => tag.set_album_artist(artist),
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| tagging_error("write", path, "path is not valid UTF-8"))?;
    tag.write_to_path(path_str)
        .map_err(|e| tagging_error("write", path, e))
}

fn write_with_lofty(path: &Path, edit: TagEdit<'_>) -> Result<(), MetadataError> {
    let mut tagged = lofty::read_from_path(path).map_err(|e| tagging_error("read", path, e))?;

    if tagged.primary_tag().is_none() {
        let tag_type = tagged.primary_tag_type();
        tagged.insert_tag(lofty::tag::Tag::new(tag_type));
    }
    let tag = tagged
        .primary_tag_mut()
        .ok_or_else(|| tagging_error("write", path, "no writable tag"))?;

    match edit {
        TagEdit::Album(album) => tag.set_album(album.to_string()),
        TagEdit::TrackNumber(number) => {
            let number =
                u32::try_from(number).map_err(|_| MetadataError::TrackNumberOutOfRange(number))?;
            tag.set_track(number);
        }
        TagEdit::AlbumArtist(artist) => {
            tag.insert_text(ItemKey::AlbumArtist, artist.to_string());
        }
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| tagging_error("write", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_file;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension_is_case_insensitive() {
        assert_eq!(
            AudioFormat::from_path(Path::new("/a/b.MP3")).unwrap(),
            AudioFormat::Mp3
        );
        assert_eq!(
            AudioFormat::from_path(Path::new("/a/b.flac")).unwrap(),
            AudioFormat::Flac
        );
        assert_eq!(
            AudioFormat::from_path(Path::new("/a/b.m4a")).unwrap(),
            AudioFormat::Mp4
        );
        assert_eq!(
            AudioFormat::from_path(Path::new("/a/b.Wav")).unwrap(),
            AudioFormat::Wav
        );
    }

    #[test]
    fn test_unsupported_extension_is_typed_error() {
        let err = AudioFormat::from_path(Path::new("/a/b.ogg")).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnsupportedFormat { ref extension } if extension == "ogg"
        ));

        let err = AudioFormat::from_path(Path::new("/a/no_extension")).unwrap_err();
        assert!(matches!(err, MetadataError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_writer_rejects_unsupported_file_without_touching_it() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "notes.txt", b"plain text");

        let result = TagWriter.set_album(&path, "Album");
        assert!(matches!(
            result,
            Err(MetadataError::UnsupportedFormat { .. })
        ));
        assert_eq!(std::fs::read(&path).unwrap(), b"plain text");
    }

    /// A single MPEG-1 Layer III frame header with no tag in front of it.
    const UNTAGGED_MP3: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00, 0x00, 0x00];

    /// Mono 16-bit PCM at 8 kHz holding two silent samples.
    fn minimal_wav() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
        bytes.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }

    #[test]
    fn test_untagged_mp3_gets_album_and_track_number() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "untagged.mp3", UNTAGGED_MP3);

        TagWriter.set_album(&path, "Road Trip").unwrap();
        TagWriter.set_track_number(&path, 3).unwrap();
        TagWriter.set_album_artist(&path, "Various Artists").unwrap();

        let tag = Tag::new()
            .with_tag_type(TagType::Id3v2)
            .read_from_path(&path)
            .unwrap();
        assert_eq!(tag.album_title(), Some("Road Trip"));
        assert_eq!(tag.track_number(), Some(3));
        assert_eq!(tag.album_artist(), Some("Various Artists"));
    }

    #[test]
    fn test_retagging_mp3_replaces_previous_values() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "song.mp3", UNTAGGED_MP3);

        TagWriter.set_album(&path, "First Album").unwrap();
        TagWriter.set_album(&path, "Second Album").unwrap();

        let tag = Tag::new()
            .with_tag_type(TagType::Id3v2)
            .read_from_path(&path)
            .unwrap();
        assert_eq!(tag.album_title(), Some("Second Album"));
    }

    #[test]
    fn test_wav_is_tagged_through_lofty() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "take.wav", &minimal_wav());

        TagWriter.set_album(&path, "Road Trip").unwrap();
        TagWriter.set_track_number(&path, 5).unwrap();

        let tagged = lofty::read_from_path(&path).unwrap();
        let tag = tagged.primary_tag().unwrap();
        assert_eq!(tag.album().as_deref(), Some("Road Trip"));
        assert_eq!(tag.track(), Some(5));
    }

    #[test]
    fn test_writer_reports_unreadable_flac() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "broken.flac", b"not a flac stream");

        let err = TagWriter.set_track_number(&path, 3).unwrap_err();
        assert!(matches!(err, MetadataError::Tagging { operation: "read", .. }));
        assert!(err.to_string().contains("broken.flac"));
    }

    #[test]
    fn test_writer_reports_unreadable_wav() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "broken.wav", b"RIFF but not really");

        let result = TagWriter.set_album_artist(&path, "Various Artists");
        assert!(matches!(
            result,
            Err(MetadataError::Tagging { operation: "read", .. })
        ));
    }
}
