use super::genius::{fetch_song_page, SongHit};
use crate::lyrics::{LyricsResult, LyricsSource, Query};
use crate::prelude::*;
use crate::{http, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";
const DEFAULT_LYRICS_HOST: &str = "genius.com";

static RESULT_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.result__a")
        .unwrap_or_else(|err| panic!("BUG: invalid result link selector: {err:?}"))
});

/// Last resort source. Looks for the song page on the lyrics site with the
/// search engine, which is much more forgiving to typos than the site's own
/// search.
pub(crate) struct WebSearch {
    http: http::Client,
    base_url: String,

    /// Only links to this host are considered
    lyrics_host: String,
}

impl WebSearch {
    pub(crate) fn new(http: http::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            lyrics_host: DEFAULT_LYRICS_HOST.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_lyrics_host(mut self, lyrics_host: impl Into<String>) -> Self {
        self.lyrics_host = lyrics_host.into();
        self
    }

    fn find_song_url(&self, html: &str) -> Option<Url> {
        let document = Html::parse_document(html);

        // Result links may be relative or protocol-relative
        let base = Url::parse("https://duckduckgo.com").ok()?;

        document
            .select(&RESULT_LINK_SELECTOR)
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| base.join(href).ok())
            .map(|url| unwrap_redirect(&url).unwrap_or(url))
            .find(|url| {
                url.host_str() == Some(self.lyrics_host.as_str())
                    && url.path().trim_end_matches('/').ends_with("-lyrics")
            })
    }
}

/// The search engine wraps the result links into its own redirect URL
fn unwrap_redirect(url: &Url) -> Option<Url> {
    let (_, target) = url.query_pairs().find(|(key, _)| key == "uddg")?;
    Url::parse(&target).ok()
}

#[async_trait]
impl LyricsSource for WebSearch {
    fn name(&self) -> &'static str {
        "web_search"
    }

    async fn fetch(&self, query: &Query) -> Result<Option<LyricsResult>> {
        let search_query = format!("{} lyrics site:{}", query.text(), self.lyrics_host);

        let html = self
            .http
            .get(format!("{}/html/", self.base_url))
            .query(&[("q", search_query.as_str())])
            .read_text()
            .await?;

        let Some(url) = self.find_song_url(&html) else {
            debug!(%search_query, "Web search found no lyrics pages");
            return Ok(None);
        };

        let hit = SongHit {
            url,
            title: query.title().to_owned(),
            artist: query.artist().to_owned(),
        };

        fetch_song_page(&self.http, hit).await
    }
}
