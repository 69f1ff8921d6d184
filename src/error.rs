use std::path::PathBuf;
use thiserror::Error;

/// Per-file pipeline failures. The batch processor turns each of these into a
/// label plus report bookkeeping; none of them aborts a run.
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("unsupported media type: {}", .0.display())]
    UnsupportedMediaType(PathBuf),

    #[error("lyrics not found for {0}")]
    NotFound(String),

    #[error("failed to read tags from {}: {source}", .path.display())]
    TagRead {
        path: PathBuf,
        source: lofty::error::LoftyError,
    },

    #[error("failed to save lyrics to {}: {source}", .path.display())]
    SaveFile {
        path: PathBuf,
        source: lofty::error::LoftyError,
    },

    #[error("request failed: {0}")]
    Http(String),
}

impl LyricsError {
    pub fn not_found(song: &crate::model::Song) -> Self {
        Self::NotFound(song.display_name())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<ureq::Error> for LyricsError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<std::io::Error> for LyricsError {
    fn from(err: std::io::Error) -> Self {
        Self::Http(err.to_string())
    }
}
