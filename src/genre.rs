use crate::model::Song;
use crate::sources::HttpClient;
use log::{debug, warn};
use serde::Deserialize;

const LASTFM_URL: &str = "https://ws.audioscrobbler.com/2.0/";

pub trait GenreLookup {
    /// Best known genre for the song, if any.
    fn lookup(&self, song: &Song) -> Option<String>;
}

/// Genre from the top community tag of a Last.fm track.
pub struct LastFmGenre {
    client: HttpClient,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopTagsResponse {
    toptags: Option<TopTags>,
}

#[derive(Debug, Deserialize)]
struct TopTags {
    #[serde(default)]
    tag: OneOrMany<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn first(&self) -> Option<&T> {
        match self {
            Self::Many(items) => items.first(),
            Self::One(item) => Some(item),
        }
    }
}

impl LastFmGenre {
    pub fn new(client: HttpClient, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn request_url(song: &Song, api_key: &str) -> String {
        format!(
            "{LASTFM_URL}?method=track.gettoptags&artist={}&track={}&api_key={}&autocorrect=1&format=json",
            urlencoding::encode(&song.artist),
            urlencoding::encode(&song.title),
            urlencoding::encode(api_key)
        )
    }
}

impl GenreLookup for LastFmGenre {
    fn lookup(&self, song: &Song) -> Option<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("no Last.fm API key configured, genre lookup disabled");
            return None;
        };

        match self
            .client
            .get_json::<TopTagsResponse>(&Self::request_url(song, api_key))
        {
            Ok(response) => top_genre(response),
            Err(err) => {
                warn!("genre lookup for {song} failed: {err}");
                None
            }
        }
    }
}

fn top_genre(response: TopTagsResponse) -> Option<String> {
    let genre = response
        .toptags?
        .tag
        .first()
        .map(|tag| tag.name.trim().to_string())
        .filter(|name| !name.is_empty());
    debug!("top tag: {genre:?}");
    genre
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(json: &str) -> Option<String> {
        top_genre(serde_json::from_str(json).expect("json"))
    }

    #[test]
    fn takes_first_top_tag() {
        let json = r#"{"toptags":{"tag":[{"name":"rock","count":100},{"name":"classic rock","count":80}],"@attr":{"artist":"The Beatles","track":"Hey Jude"}}}"#;
        assert_eq!(parse(json).as_deref(), Some("rock"));
    }

    #[test]
    fn accepts_single_tag_object() {
        assert_eq!(parse(r#"{"toptags":{"tag":{"name":"jazz"}}}"#).as_deref(), Some("jazz"));
    }

    #[test]
    fn no_tags_or_error_payload_is_absent() {
        assert_eq!(parse(r#"{"toptags":{"tag":[]}}"#), None);
        assert_eq!(parse(r#"{"toptags":{}}"#), None);
        assert_eq!(parse(r#"{"error":6,"message":"Track not found"}"#), None);
    }

    #[test]
    fn request_url_escapes_song_fields() {
        let url = LastFmGenre::request_url(&Song::new("Hey Jude", "The Beatles"), "k3y");
        assert_eq!(
            url,
            "https://ws.audioscrobbler.com/2.0/?method=track.gettoptags&artist=The%20Beatles&track=Hey%20Jude&api_key=k3y&autocorrect=1&format=json"
        );
    }

    #[test]
    fn missing_key_skips_the_request() {
        let client = HttpClient::new(Duration::from_secs(1), "test");
        let lookup = LastFmGenre::new(client, Some(String::from("  ")));
        assert_eq!(lookup.lookup(&Song::new("t", "a")), None);
    }
}
