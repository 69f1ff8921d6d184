use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Song {
    pub title: String,
    pub artist: String,
}

impl Song {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// `"artist - title"`, used for provider queries, matching and logs.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// One candidate lyrics result attributed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub source_id: String,
    pub title: String,
    pub artist: String,
    pub lyrics: String,
}

/// Variants for one song keyed by source id, in source registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSet {
    entries: Vec<Variant>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variant, replacing an earlier one from the same source in place.
    pub fn insert(&mut self, variant: Variant) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.source_id == variant.source_id)
        {
            Some(existing) => *existing = variant,
            None => self.entries.push(variant),
        }
    }

    pub fn get(&self, source_id: &str) -> Option<&Variant> {
        self.entries.iter().find(|entry| entry.source_id == source_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.source_id.as_str())
    }
}

impl IntoIterator for VariantSet {
    type Item = Variant;
    type IntoIter = std::vec::IntoIter<Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Variant> for VariantSet {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        let mut set = Self::new();
        for variant in iter {
            set.insert(variant);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Mp3,
    M4a,
    Flac,
}

impl MediaFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(OsStr::to_str)?;
        if ext.eq_ignore_ascii_case("mp3") {
            Some(Self::Mp3)
        } else if ext.eq_ignore_ascii_case("m4a") {
            Some(Self::M4a)
        } else if ext.eq_ignore_ascii_case("flac") {
            Some(Self::Flac)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => ".mp3",
            Self::M4a => ".m4a",
            Self::Flac => ".flac",
        }
    }
}

/// A local audio file together with the tags the picker cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub path: PathBuf,
    pub format: MediaFormat,
    pub title: String,
    pub artist: String,
    pub lyrics: String,
}

impl AudioTrack {
    pub fn song(&self) -> Song {
        Song::new(self.title.clone(), self.artist.clone())
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn has_lyrics(&self) -> bool {
        !self.lyrics.is_empty()
    }
}

impl fmt::Display for AudioTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {} ({})",
            self.format.extension(),
            self.artist,
            self.title,
            self.file_name()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub skipped: Vec<PathBuf>,
    pub broken: Vec<PathBuf>,
}

impl BatchReport {
    pub fn add_skipped(&mut self, path: &Path) {
        self.skipped.push(path.to_path_buf());
    }

    pub fn add_broken(&mut self, path: &Path) {
        self.broken.push(path.to_path_buf());
    }
}
