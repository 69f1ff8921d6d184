use super::http::{self, HttpClient};
use super::{RankedSource, RawCandidate, SearchBackend};
use crate::error::LyricsError;
use crate::model::Song;
use log::debug;
use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Predicate};
use serde::Deserialize;
use std::collections::HashSet;

pub const SOURCE_ID: &str = "GENIUS";
const SEARCH_URL: &str = "https://genius.com/api/search/multi";
const CANDIDATE_LIMIT: usize = 5;

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    response: SearchPayload,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    sections: Vec<SearchSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchSection {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    #[serde(default, rename = "type")]
    hit_type: String,
    result: SongResult,
}

#[derive(Debug, Clone, Deserialize)]
struct SongResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    title_with_featured: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    primary_artist: Option<PrimaryArtist>,
}

#[derive(Debug, Clone, Deserialize)]
struct PrimaryArtist {
    #[serde(default)]
    name: String,
}

pub struct GeniusBackend {
    client: HttpClient,
}

impl GeniusBackend {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn search_url(song: &Song) -> String {
        format!(
            "{SEARCH_URL}?q={}&per_page={CANDIDATE_LIMIT}",
            urlencoding::encode(&song.display_name())
        )
    }
}

pub fn source(client: HttpClient) -> RankedSource<GeniusBackend> {
    RankedSource::new(SOURCE_ID, CANDIDATE_LIMIT, GeniusBackend::new(client))
}

impl SearchBackend for GeniusBackend {
    fn fetch_candidates(&self, song: &Song) -> Result<Vec<RawCandidate>, LyricsError> {
        let response: SearchResponse = self.client.get_json(&Self::search_url(song))?;
        Ok(candidates_from_response(response))
    }

    fn fetch_lyrics(&self, locator: &str) -> Result<Option<String>, LyricsError> {
        let page = self.client.get_text(locator)?;
        Ok(extract_lyrics(&page))
    }
}

fn candidates_from_response(response: SearchResponse) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    response
        .response
        .sections
        .into_iter()
        .flat_map(|section| section.hits)
        .filter(|hit| hit.hit_type.eq_ignore_ascii_case("song"))
        .filter(|hit| !hit.result.url.trim().is_empty() && seen.insert(hit.result.url.clone()))
        .map(|hit| {
            let result = hit.result;
            let artist = result
                .primary_artist
                .map(|artist| artist.name)
                .unwrap_or_default();
            let shown = result.title_with_featured.as_deref().unwrap_or(&result.title);
            debug!("- name: '{artist} - {shown}'");
            RawCandidate::fields(&result.title, &artist, &result.url)
        })
        .collect()
}

fn extract_lyrics(page: &str) -> Option<String> {
    let document = Document::from(page);
    let mut blocks = text_blocks(document.find(Attr("data-lyrics-container", "true")));
    if blocks.is_empty() {
        blocks = text_blocks(document.find(Name("div").and(Class("lyrics"))));
    }

    (!blocks.is_empty()).then(|| blocks.join("\n"))
}

fn text_blocks<'a>(nodes: impl Iterator<Item = Node<'a>>) -> Vec<String> {
    nodes
        .map(|node| http::rendered_text(node).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
