use super::http::{self, HttpClient};
use super::{RankedSource, RawCandidate, SearchBackend};
use crate::error::LyricsError;
use crate::model::Song;
use log::debug;
use select::document::Document;
use select::predicate::{Class, Name, Predicate};

pub const SOURCE_ID: &str = "TEKSTOWO";
const PAGE_URL: &str = "https://www.tekstowo.pl";
const CANDIDATE_LIMIT: usize = 10;

pub struct TekstowoBackend {
    client: HttpClient,
}

impl TekstowoBackend {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn search_url(song: &Song) -> String {
        format!(
            "{PAGE_URL}/szukaj,wykonawca,{},tytul,{}",
            urlencoding::encode(&song.artist),
            urlencoding::encode(&song.title)
        )
    }
}

pub fn source(client: HttpClient) -> RankedSource<TekstowoBackend> {
    RankedSource::new(SOURCE_ID, CANDIDATE_LIMIT, TekstowoBackend::new(client))
}

impl SearchBackend for TekstowoBackend {
    fn fetch_candidates(&self, song: &Song) -> Result<Vec<RawCandidate>, LyricsError> {
        let page = self.client.get_text(&Self::search_url(song))?;
        Ok(parse_search_page(&page))
    }

    fn fetch_lyrics(&self, locator: &str) -> Result<Option<String>, LyricsError> {
        let page = self.client.get_text(locator)?;
        Ok(extract_lyrics(&page))
    }
}

fn parse_search_page(page: &str) -> Vec<RawCandidate> {
    let document = Document::from(page);
    let results = Name("div")
        .and(Class("content"))
        .child(Name("div").and(Class("box-przeboje")));

    document
        .find(results)
        .take(CANDIDATE_LIMIT)
        .map(|entry| {
            let link = entry.find(Name("a").and(Class("title"))).next();
            let name = link.and_then(|tag| tag.attr("title")).unwrap_or_default();
            let locator = link
                .and_then(|tag| tag.attr("href"))
                .map(absolute_url)
                .unwrap_or_default();
            debug!("- name: '{name}'");
            RawCandidate::combined(name, &locator)
        })
        .collect()
}

fn absolute_url(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{PAGE_URL}{href}")
    }
}

fn extract_lyrics(page: &str) -> Option<String> {
    let document = Document::from(page);
    let block = document.find(Name("div").and(Class("song-text"))).next()?;
    let direct = http::direct_text(block);
    if !direct.trim().is_empty() {
        return Some(direct);
    }

    let nested = block
        .find(Name("div").and(Class("inner-text")))
        .next()
        .map(http::rendered_text)
        .unwrap_or_default();
    (!nested.trim().is_empty()).then_some(nested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::CandidateName;

    #[test]
    fn search_url_escapes_artist_and_title() {
        let url = TekstowoBackend::search_url(&Song::new("Mały Książę", "Kult & Friends"));
        assert_eq!(
            url,
            "https://www.tekstowo.pl/szukaj,wykonawca,Kult%20%26%20Friends,tytul,Ma%C5%82y%20Ksi%C4%85%C5%BC%C4%99"
        );
    }

    #[test]
    fn parses_result_boxes_in_page_order() {
        let page = r#"<div class="sidebar">
            <div class="box-przeboje"><a href="/piosenka,chart,hit.html" class="title" title="Chart - Hit">Chart - Hit</a></div>
        </div>
        <div class="content">
            <div class="box-przeboje"><div class="flex-group"><a href="/piosenka,kult,arahja.html" class="title" title="Kult - Arahja">Kult - Arahja</a></div></div>
            <div class="box-przeboje"><a href='/piosenka,kult,baranek.html' class='title' title='Kult - Baranek'>Baranek</a></div>
            <div class="box-przeboje"><a href="/piosenka,x,y.html" class="title" title="">?</a></div>
            <div class="box-przeboje"><a class="title" title="Kult - Bez linku">?</a></div>
            <div class="box-przeboje"><span>no link</span></div>
        </div>"#;

        let candidates = parse_search_page(page);
        assert_eq!(candidates.len(), 5);
        assert_eq!(
            candidates[0].name,
            CandidateName::Combined(String::from("Kult - Arahja"))
        );
        assert_eq!(
            candidates[0].locator,
            "https://www.tekstowo.pl/piosenka,kult,arahja.html"
        );
        assert_eq!(
            candidates[1].name,
            CandidateName::Combined(String::from("Kult - Baranek"))
        );
        assert_eq!(
            candidates[1].locator,
            "https://www.tekstowo.pl/piosenka,kult,baranek.html"
        );
        assert_eq!(candidates[2].name, CandidateName::Combined(String::new()));
        assert_eq!(candidates[3].locator, "");
        assert_eq!(candidates[4].name, CandidateName::Combined(String::new()));

        let song = Song::new("Bez linku", "Kult");
        assert_eq!(candidates[3].score(&song), None);
    }

    #[test]
    fn lyrics_use_direct_text_of_song_block() {
        let page = r#"<div class="song-text">
Pierwsza linia<br />
Druga linia<div class="adv">reklama</div>
</div>"#;
        assert_eq!(
            extract_lyrics(page).as_deref(),
            Some("\nPierwsza linia\nDruga linia\n")
        );
    }

    #[test]
    fn lyrics_fall_back_to_inner_text_block() {
        let page = r#"<div class="song-text" id="songText"><h2>Tekst piosenki:</h2><div class="inner-text">Raz<br />Dwa</div></div>"#;
        assert_eq!(extract_lyrics(page).as_deref(), Some("Raz\nDwa"));
        assert_eq!(extract_lyrics("<p>nothing</p>"), None);
    }

    #[test]
    fn commented_markup_does_not_leak_the_footer_into_lyrics() {
        let page = "<div class=\"song-text\">Line one<!-- <div class=\"x\"> -->\nLine two</div><div class=\"footer\">Copyright footer</div></div>";
        assert_eq!(extract_lyrics(page).as_deref(), Some("Line one\nLine two"));
    }
}
