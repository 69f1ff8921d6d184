use crate::error::LyricsError;
use crate::model::{AudioTrack, MediaFormat};
use log::{debug, warn};
use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::prelude::{Accessor, ItemKey};
use lofty::probe::Probe;
use lofty::tag::{Tag, TagType};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Tag access for the batch pipeline.
pub trait TrackStore {
    fn read_track(&self, path: &Path) -> Result<AudioTrack, LyricsError>;
    fn save_lyrics(&self, track: &AudioTrack, lyrics: &str) -> Result<(), LyricsError>;
}

/// Reads and writes embedded tags through lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyStore;

impl TrackStore for LoftyStore {
    fn read_track(&self, path: &Path) -> Result<AudioTrack, LyricsError> {
        read_track(path)
    }

    fn save_lyrics(&self, track: &AudioTrack, lyrics: &str) -> Result<(), LyricsError> {
        save_lyrics(&track.path, track.format, lyrics)
    }
}

pub fn read_track(path: &Path) -> Result<AudioTrack, LyricsError> {
    let format = MediaFormat::from_path(path)
        .ok_or_else(|| LyricsError::UnsupportedMediaType(path.to_path_buf()))?;

    let tagged_file = Probe::open(path)
        .and_then(|probe| probe.read())
        .map_err(|source| LyricsError::TagRead {
            path: path.to_path_buf(),
            source,
        })?;

    let track = match readable_tag(&tagged_file, format) {
        Some(tag) => AudioTrack {
            path: path.to_path_buf(),
            format,
            title: tag.title().map(|value| value.into_owned()).unwrap_or_default(),
            artist: tag.artist().map(|value| value.into_owned()).unwrap_or_default(),
            lyrics: lyrics_of(tag),
        },
        None => AudioTrack {
            path: path.to_path_buf(),
            format,
            title: String::new(),
            artist: String::new(),
            lyrics: String::new(),
        },
    };
    debug!("read tags: {track}");
    Ok(track)
}

pub fn save_lyrics(path: &Path, format: MediaFormat, lyrics: &str) -> Result<(), LyricsError> {
    let save_error = |source| LyricsError::SaveFile {
        path: path.to_path_buf(),
        source,
    };

    let mut tagged_file = Probe::open(path)
        .and_then(|probe| probe.read())
        .map_err(save_error)?;

    let tag_type = preferred_tag_type(format);
    if tagged_file.tag_mut(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    if let Some(tag) = tagged_file.tag_mut(tag_type) {
        tag.retain(|item| !matches!(item.key(), ItemKey::Lyrics));
        if !tag.insert_text(ItemKey::Lyrics, lyrics.to_string()) {
            warn!("{tag_type:?} rejected the lyrics item for {}", path.display());
        }
    }

    tagged_file
        .save_to_path(path, WriteOptions::default())
        .map_err(save_error)
}

pub fn preferred_tag_type(format: MediaFormat) -> TagType {
    match format {
        MediaFormat::Mp3 => TagType::Id3v2,
        MediaFormat::M4a => TagType::Mp4Ilst,
        MediaFormat::Flac => TagType::VorbisComments,
    }
}

fn readable_tag(tagged_file: &TaggedFile, format: MediaFormat) -> Option<&Tag> {
    tagged_file
        .tag(preferred_tag_type(format))
        .or_else(|| tagged_file.primary_tag())
        .or_else(|| tagged_file.first_tag())
}

fn lyrics_of(tag: &Tag) -> String {
    tag.items()
        .find(|item| matches!(item.key(), ItemKey::Lyrics))
        .and_then(|item| item.value().text())
        .map(str::to_string)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEntry {
    Directory { path: PathBuf, depth: usize },
    File { path: PathBuf, depth: usize },
}

impl InputEntry {
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory { path, .. } | Self::File { path, .. } => path,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Directory { depth, .. } | Self::File { depth, .. } => *depth,
        }
    }
}

/// Expands one command-line input into the directories and files under it,
/// parents before children. Depth counts from the input itself.
pub fn walk_input(root: &Path) -> Box<dyn Iterator<Item = InputEntry>> {
    if !root.is_dir() {
        return Box::new(std::iter::once(InputEntry::File {
            path: root.to_path_buf(),
            depth: 0,
        }));
    }

    let entries = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .map(|entry| {
            let depth = entry.depth();
            let path = entry.into_path();
            if path.is_dir() {
                InputEntry::Directory { path, depth }
            } else {
                InputEntry::File { path, depth }
            }
        });
    Box::new(entries)
}
