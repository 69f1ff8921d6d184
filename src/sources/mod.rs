//! Lyrics providers and the ranking they share.
//!
//! Every provider follows the same shape: fetch a short list of raw search
//! hits, score each hit against the wanted song with
//! [`crate::similarity::distance`], keep the first hit with the lowest score
//! (stopping early on an exact match), then download and clean that hit's
//! lyrics. Only the fetching and parsing differ, so providers implement
//! [`SearchBackend`] and get wrapped in a [`RankedSource`].

pub mod genius;
pub mod http;
pub mod tekstowo;

use crate::error::LyricsError;
use crate::model::{Song, Variant};
use crate::similarity::distance;
use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

pub use genius::GeniusBackend;
pub use http::HttpClient;
pub use tekstowo::TekstowoBackend;

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank run pattern"));

pub trait LyricsSource: Send + Sync {
    fn id(&self) -> &str;

    fn search(&self, song: &Song) -> Result<Variant, LyricsError>;
}

/// How a raw search hit names its song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateName {
    /// Title and artist reported separately; scored field by field.
    Fields { title: String, artist: String },
    /// A single `"artist - title"` string; scored against the display name.
    Combined(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub name: CandidateName,
    pub locator: String,
}

impl RawCandidate {
    pub fn fields(title: &str, artist: &str, locator: &str) -> Self {
        Self {
            name: CandidateName::Fields {
                title: title.to_string(),
                artist: artist.to_string(),
            },
            locator: locator.to_string(),
        }
    }

    pub fn combined(name: &str, locator: &str) -> Self {
        Self {
            name: CandidateName::Combined(name.to_string()),
            locator: locator.to_string(),
        }
    }

    /// Distance to `song`, or `None` when the hit carries no usable name or
    /// has nothing to download.
    pub fn score(&self, song: &Song) -> Option<u32> {
        if self.locator.trim().is_empty() {
            return None;
        }
        match &self.name {
            CandidateName::Fields { title, artist } => {
                if title.trim().is_empty() && artist.trim().is_empty() {
                    return None;
                }
                let title_distance = distance(title, &song.title);
                let artist_distance = distance(artist, &song.artist);
                debug!(
                    "  distance: {title_distance} + {artist_distance} = {}",
                    title_distance + artist_distance
                );
                Some(title_distance + artist_distance)
            }
            CandidateName::Combined(name) => {
                if name.is_empty() || !name.contains('-') {
                    return None;
                }
                let combined_distance = distance(name, &song.display_name());
                debug!("  distance: {combined_distance}");
                Some(combined_distance)
            }
        }
    }

    /// Title and artist of the hit as they should appear on the variant.
    pub fn title_and_artist(&self) -> (String, String) {
        match &self.name {
            CandidateName::Fields { title, artist } => (title.clone(), artist.clone()),
            CandidateName::Combined(name) => match name.split_once(" - ") {
                Some((artist, title)) => (title.to_string(), artist.to_string()),
                None => (String::new(), name.clone()),
            },
        }
    }
}

/// Provider-specific fetching and parsing.
pub trait SearchBackend: Send + Sync {
    /// Raw hits for `song`, in the order the provider returned them.
    fn fetch_candidates(&self, song: &Song) -> Result<Vec<RawCandidate>, LyricsError>;

    /// Lyrics text behind a hit's locator, `None` when the page has none.
    fn fetch_lyrics(&self, locator: &str) -> Result<Option<String>, LyricsError>;
}

pub struct RankedSource<B> {
    id: String,
    limit: usize,
    backend: B,
}

impl<B: SearchBackend> RankedSource<B> {
    pub fn new(id: &str, limit: usize, backend: B) -> Self {
        Self {
            id: id.to_string(),
            limit,
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn search_inner(&self, song: &Song) -> Result<Variant, LyricsError> {
        let mut candidates = self.backend.fetch_candidates(song)?;
        candidates.truncate(self.limit);
        if candidates.is_empty() {
            debug!("{}: no candidates for {song}", self.id);
            return Err(LyricsError::not_found(song));
        }

        debug!("{}: ranking {} candidates", self.id, candidates.len());
        let (best, best_distance) =
            select_best(candidates, |candidate| candidate.score(song))
                .ok_or_else(|| LyricsError::not_found(song))?;
        debug!(
            "{}: selected {:?} at distance {best_distance}",
            self.id, best.name
        );

        let raw = self.backend.fetch_lyrics(&best.locator)?.unwrap_or_default();
        let lyrics = clean_lyrics(&raw);
        if lyrics.is_empty() {
            return Err(LyricsError::not_found(song));
        }

        let (title, artist) = best.title_and_artist();
        Ok(Variant {
            source_id: self.id.clone(),
            title,
            artist,
            lyrics,
        })
    }
}

impl<B: SearchBackend> LyricsSource for RankedSource<B> {
    fn id(&self) -> &str {
        &self.id
    }

    fn search(&self, song: &Song) -> Result<Variant, LyricsError> {
        debug!("Searching in {}: {song}", self.id);
        self.search_inner(song).map_err(|err| match err {
            LyricsError::NotFound(_) => err,
            other => {
                warn!("{} failed for {song}: {other}", self.id);
                LyricsError::not_found(song)
            }
        })
    }
}

/// First candidate with the minimum score. Candidates scoring `None` are
/// skipped; iteration stops as soon as a zero score is seen.
pub fn select_best<T, F>(candidates: impl IntoIterator<Item = T>, mut score: F) -> Option<(T, u32)>
where
    F: FnMut(&T) -> Option<u32>,
{
    let mut best: Option<(T, u32)> = None;
    for candidate in candidates {
        let Some(candidate_score) = score(&candidate) else {
            continue;
        };
        if best
            .as_ref()
            .is_none_or(|(_, best_score)| candidate_score < *best_score)
        {
            best = Some((candidate, candidate_score));
        }
        if best.as_ref().is_some_and(|(_, best_score)| *best_score == 0) {
            break;
        }
    }
    best
}

/// Trims the text and collapses runs of three or more newlines to a blank line.
pub fn clean_lyrics(raw: &str) -> String {
    BLANK_RUN.replace_all(raw.trim(), "\n\n").trim().to_string()
}

/// Providers in registration order.
pub fn default_sources(client: &HttpClient) -> Vec<Box<dyn LyricsSource>> {
    vec![
        Box::new(genius::source(client.clone())),
        Box::new(tekstowo::source(client.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Mutex;

    struct StubBackend {
        candidates: Vec<RawCandidate>,
        lyrics: Option<String>,
        requested: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn new(candidates: Vec<RawCandidate>, lyrics: Option<&str>) -> Self {
            Self {
                candidates,
                lyrics: lyrics.map(str::to_string),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl SearchBackend for StubBackend {
        fn fetch_candidates(&self, _song: &Song) -> Result<Vec<RawCandidate>, LyricsError> {
            Ok(self.candidates.clone())
        }

        fn fetch_lyrics(&self, locator: &str) -> Result<Option<String>, LyricsError> {
            self.requested
                .lock()
                .expect("lock")
                .push(locator.to_string());
            Ok(self.lyrics.clone())
        }
    }

    struct FailingBackend;

    impl SearchBackend for FailingBackend {
        fn fetch_candidates(&self, _song: &Song) -> Result<Vec<RawCandidate>, LyricsError> {
            Err(LyricsError::Http(String::from("connection refused")))
        }

        fn fetch_lyrics(&self, _locator: &str) -> Result<Option<String>, LyricsError> {
            Ok(None)
        }
    }

    #[test]
    fn ties_keep_the_first_lowest_score() {
        let scores = [3, 1, 1, 5];
        let (index, score) =
            select_best(0..scores.len(), |index| Some(scores[*index])).expect("selection");
        assert_eq!(index, 1);
        assert_eq!(score, 1);
    }

    #[test]
    fn exact_match_stops_scoring_later_candidates() {
        let evaluated = Cell::new(0);
        let picked = select_best(0..4, |index| {
            evaluated.set(evaluated.get() + 1);
            if *index > 0 {
                panic!("candidate {index} must not be scored");
            }
            Some(0)
        });
        assert_eq!(picked, Some((0, 0)));
        assert_eq!(evaluated.get(), 1);
    }

    #[test]
    fn unusable_candidates_are_skipped() {
        assert_eq!(select_best([None, Some(4), None], |score| *score), Some((Some(4), 4)));
        assert_eq!(select_best([None::<u32>, None], |score| *score), None);
    }

    #[test]
    fn combined_names_without_dash_are_unusable() {
        let song = Song::new("Song", "Artist");
        assert_eq!(RawCandidate::combined("", "/x").score(&song), None);
        assert_eq!(RawCandidate::combined("Just a title", "/x").score(&song), None);
        assert_eq!(RawCandidate::combined("Artist - Song", "/x").score(&song), Some(0));
    }

    #[test]
    fn candidates_without_locator_are_unusable() {
        let song = Song::new("Song", "Artist");
        assert_eq!(RawCandidate::combined("Artist - Song", "").score(&song), None);
        assert_eq!(RawCandidate::fields("Song", "Artist", " ").score(&song), None);
    }

    #[test]
    fn combined_name_splits_on_first_separator() {
        let candidate = RawCandidate::combined("AC - DC - Thunder - Struck", "/x");
        assert_eq!(
            candidate.title_and_artist(),
            (String::from("DC - Thunder - Struck"), String::from("AC"))
        );
    }

    #[test]
    fn clean_lyrics_collapses_blank_runs() {
        assert_eq!(clean_lyrics("\n  a\n\n\n\nb\n\nc  \n"), "a\n\nb\n\nc");
    }

    #[test]
    fn ranked_source_downloads_best_candidate() {
        let backend = StubBackend::new(
            vec![
                RawCandidate::fields("Yesterday Live", "Beatles", "/far"),
                RawCandidate::fields("Yesterday", "The Beatles", "/exact"),
                RawCandidate::fields("Yesterday", "The Beatles", "/duplicate"),
            ],
            Some("Yesterday\n\n\n\nall my troubles"),
        );
        let source = RankedSource::new("STUB", 5, backend);

        let variant = source
            .search(&Song::new("Yesterday", "The Beatles"))
            .expect("variant");

        assert_eq!(variant.source_id, "STUB");
        assert_eq!(variant.title, "Yesterday");
        assert_eq!(variant.lyrics, "Yesterday\n\nall my troubles");
        assert_eq!(
            *source.backend().requested.lock().expect("lock"),
            vec![String::from("/exact")]
        );
    }

    #[test]
    fn ranked_source_respects_candidate_limit() {
        let backend = StubBackend::new(
            vec![
                RawCandidate::fields("Other", "Band", "/first"),
                RawCandidate::fields("Wanted", "Band", "/beyond-limit"),
            ],
            Some("words"),
        );
        let source = RankedSource::new("STUB", 1, backend);

        source.search(&Song::new("Wanted", "Band")).expect("variant");
        assert_eq!(
            *source.backend().requested.lock().expect("lock"),
            vec![String::from("/first")]
        );
    }

    #[test]
    fn ranked_source_reports_not_found() {
        let song = Song::new("Song", "Artist");

        let empty = RankedSource::new("STUB", 5, StubBackend::new(Vec::new(), Some("x")));
        assert!(empty.search(&song).expect_err("no hits").is_not_found());

        let blank = RankedSource::new(
            "STUB",
            5,
            StubBackend::new(vec![RawCandidate::fields("Song", "Artist", "/a")], Some(" \n\n ")),
        );
        assert!(blank.search(&song).expect_err("blank lyrics").is_not_found());

        let unusable = RankedSource::new(
            "STUB",
            5,
            StubBackend::new(vec![RawCandidate::combined("no dash", "/a")], Some("x")),
        );
        assert!(unusable.search(&song).expect_err("no usable name").is_not_found());
    }

    #[test]
    fn transport_failures_surface_as_not_found() {
        let source = RankedSource::new("STUB", 5, FailingBackend);
        let err = source
            .search(&Song::new("Song", "Artist"))
            .expect_err("failure");
        assert!(err.is_not_found());
    }
}
