//! Lookup of song lyrics across several independent lyrics sources.

mod normalize;
mod pipeline;
mod sources;

use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub(crate) use pipeline::*;

#[cfg(test)]
pub(crate) use pipeline::tests::LONG_LYRICS;

pub(crate) const LYRICS_SOURCE_DURATION_SECONDS: &str = "lyrics_source_duration_seconds";
pub(crate) const LYRICS_LOOKUP_DURATION_SECONDS: &str = "lyrics_lookup_duration_seconds";

/// Separator between the artist and the title in the query, e.g.
/// `The Weeknd - Blinding Lights`.
const ARTIST_TITLE_SEPARATOR: &str = " - ";

/// Placeholder for the title or the artist when a source doesn't report them.
const UNKNOWN: &str = "Unknown";

/// Song name typed by the user. It is guaranteed to be non-empty and
/// contain no leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Query {
    text: String,
}

impl Query {
    /// Returns [`None`] if the input is blank.
    pub(crate) fn parse(input: &str) -> Option<Self> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_owned(),
        })
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Artist part of the `artist - title` query. Empty if the query has no
    /// separator.
    pub(crate) fn artist(&self) -> &str {
        self.split().0
    }

    /// Title part of the `artist - title` query. The whole query if there is
    /// no separator.
    pub(crate) fn title(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        match self.text.split_once(ARTIST_TITLE_SEPARATOR) {
            Some((artist, title)) => (artist.trim(), title.trim()),
            None => ("", &self.text),
        }
    }
}

/// Canonical lyrics record returned by the lookup regardless of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LyricsResult {
    title: String,
    artist: String,
    lyrics: String,
}

impl LyricsResult {
    /// The values must be plain text, only the whitespace is normalized here.
    pub(crate) fn new(title: &str, artist: &str, lyrics: &str) -> Self {
        let or_unknown = |value: String| {
            if value.is_empty() {
                UNKNOWN.to_owned()
            } else {
                value
            }
        };

        Self {
            title: or_unknown(normalize::single_line(title)),
            artist: or_unknown(normalize::single_line(artist)),
            lyrics: normalize::lyrics(lyrics),
        }
    }

    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn artist(&self) -> &str {
        &self.artist
    }

    pub(crate) fn lyrics(&self) -> &str {
        &self.lyrics
    }
}

/// Provider-specific adapter that fetches lyrics from a single source.
///
/// Implementations must not keep any state between calls except for the
/// HTTP client they were created with.
#[async_trait]
pub(crate) trait LyricsSource: Send + Sync {
    /// Short name of the source used in logs and metrics
    fn name(&self) -> &'static str;

    /// Returns `Ok(None)` if the source doesn't know the song.
    async fn fetch(&self, query: &Query) -> Result<Option<LyricsResult>>;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum SourceKind {
    /// Authenticated Genius API
    GeniusApi,

    /// Search on the Genius website
    GeniusWeb,

    /// LRCLIB public API
    Lrclib,

    /// lyrics.ovh public API
    LyricsOvh,

    /// Web search engine restricted to a lyrics site
    WebSearch,
}

impl SourceKind {
    const DEFAULT_ORDER: [SourceKind; 5] = [
        SourceKind::GeniusApi,
        SourceKind::GeniusWeb,
        SourceKind::Lrclib,
        SourceKind::LyricsOvh,
        SourceKind::WebSearch,
    ];
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Config {
    /// Token for the Genius API. The `genius_api` source fails if it's not set.
    #[serde(default)]
    pub(crate) genius_token: Option<String>,

    /// Ordered list of sources to try. The first source that returns lyrics wins.
    #[serde(default = "default_sources")]
    pub(crate) sources: Vec<SourceKind>,

    #[serde(default = "default_http_timeout_secs")]
    pub(crate) http_timeout_secs: u64,

    /// Lyrics shorter than this number of characters are considered garbage
    #[serde(default = "default_min_lyrics_len")]
    pub(crate) min_lyrics_len: usize,
}

impl Config {
    pub(crate) fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn default_sources() -> Vec<SourceKind> {
    SourceKind::DEFAULT_ORDER.to_vec()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_min_lyrics_len() -> usize {
    50
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum LyricsSourceError {
    #[error("Lyrics source `{name}` requires an API token, but it isn't configured")]
    MissingToken { name: &'static str },

    #[error("Unexpected page structure at {url}: {reason}")]
    UnexpectedPage { url: url::Url, reason: &'static str },
}
