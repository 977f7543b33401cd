//! Genius is the main lyrics source. The song pages don't have a public API
//! for the lyrics text, so it is scraped from the HTML of the song page.

mod api;
mod web;

use crate::lyrics::{LyricsResult, LyricsSourceError, Query};
use crate::prelude::*;
use crate::{err, http, Result};
use lazy_regex::regex_captures;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;

pub(crate) use api::*;
pub(crate) use web::*;

static JSON_LD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| parse_selector(r#"script[type="application/ld+json"]"#));

static LYRICS_CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| parse_selector("div[data-lyrics-container]"));

fn parse_selector(selector: &str) -> Selector {
    Selector::parse(selector)
        .unwrap_or_else(|err| panic!("BUG: invalid CSS selector `{selector}`: {err:?}"))
}

/// Link to the song page with the metadata known before the page is loaded.
/// The metadata is used as a fallback if the page itself doesn't have it.
#[derive(Debug, Clone)]
pub(crate) struct SongHit {
    pub(crate) url: url::Url,
    pub(crate) title: String,
    pub(crate) artist: String,
}

/// Loads the song page and extracts the lyrics from it. Returns [`None`] if
/// the page doesn't exist.
pub(crate) async fn fetch_song_page(http: &http::Client, hit: SongHit) -> Result<Option<LyricsResult>> {
    let Some(html) = http.get(hit.url.clone()).read_text_or_not_found().await? else {
        return Ok(None);
    };

    parse_song_page(&html, &hit).map(Some)
}

fn parse_song_page(html: &str, hit: &SongHit) -> Result<LyricsResult> {
    let document = Html::parse_document(html);

    let lyrics = json_ld_lyrics(&document)
        .or_else(|| container_lyrics(&document))
        .ok_or_else(|| {
            err!(LyricsSourceError::UnexpectedPage {
                url: hit.url.clone(),
                reason: "no lyrics found on the song page",
            })
        })?;

    let title = json_string_field(regex_captures!(r#""trackName"\s*:\s*"((?:[^"\\]|\\.)*)""#, html))
        .unwrap_or_else(|| hit.title.clone());

    let artist = json_string_field(regex_captures!(
        r#""byArtist"\s*:\s*\{[^}]*?"name"\s*:\s*"((?:[^"\\]|\\.)*)""#,
        html
    ))
    .unwrap_or_else(|| hit.artist.clone());

    Ok(LyricsResult::new(&title, &artist, &lyrics))
}

/// The value is captured from the raw JSON, so it may contain escapes
fn json_string_field(captures: Option<(&str, &str)>) -> Option<String> {
    let (_, value) = captures?;
    let value: String = serde_json::from_str(&format!("\"{value}\"")).ok()?;
    Some(value).filter(|value| !value.trim().is_empty())
}

fn json_ld_lyrics(document: &Html) -> Option<String> {
    document
        .select(&JSON_LD_SELECTOR)
        .filter_map(|script| {
            let json = script.text().collect::<String>();
            serde_json::from_str::<serde_json::Value>(&json).ok()
        })
        .find_map(|json| {
            let text = json
                .get("text")
                .or_else(|| json.get("lyrics")?.get("text"))?
                .as_str()?;

            // The text is an HTML fragment with `<br>` line breaks and entities
            let fragment = Html::parse_fragment(text);
            let text = html_text(fragment.root_element());

            Some(text).filter(|text| !text.trim().is_empty())
        })
}

fn container_lyrics(document: &Html) -> Option<String> {
    let lyrics = document
        .select(&LYRICS_CONTAINER_SELECTOR)
        .map(html_text)
        .collect::<Vec<_>>()
        .join("\n");

    Some(lyrics).filter(|lyrics| !lyrics.trim().is_empty())
}

/// Plain text of the element with `<br>` turned into line breaks. The
/// entities are already decoded by the HTML parser.
fn html_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(chunk) => text.push_str(chunk),
            Node::Element(element) if element.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Shape of the search hits in both the official API and the web search.
/// Hits of other types (artists, albums, users) have a different `result`
/// shape, and we don't need them.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SearchHit {
    Song {
        result: SongInfo,
    },

    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct SongInfo {
    url: url::Url,
    title: String,
    primary_artist: ArtistInfo,
}

#[derive(Debug, Deserialize)]
struct ArtistInfo {
    name: String,
}

impl SearchHit {
    fn into_song(self) -> Option<SongHit> {
        let Self::Song { result } = self else {
            return None;
        };
        Some(SongHit {
            url: result.url,
            title: result.title,
            artist: result.primary_artist.name,
        })
    }
}

/// Envelope of every Genius JSON response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

fn first_song(hits: impl IntoIterator<Item = SearchHit>, query: &Query) -> Option<SongHit> {
    let song = hits.into_iter().find_map(SearchHit::into_song);
    if song.is_none() {
        debug!(query = query.text(), "Genius returned no song hits");
    }
    song
}
