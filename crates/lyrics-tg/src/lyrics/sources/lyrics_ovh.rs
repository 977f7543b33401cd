use crate::lyrics::{LyricsResult, LyricsSource, Query};
use crate::prelude::*;
use crate::{http, Result};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.lyrics.ovh";

/// Unofficial lyrics API that can only look up songs by the exact artist
/// and title, so it is useless for queries without the artist part.
pub(crate) struct LyricsOvh {
    http: http::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct LyricsResponse {
    lyrics: String,
}

impl LyricsOvh {
    pub(crate) fn new(http: http::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn lyrics_url(&self, artist: &str, title: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .fatal_ctx(|| format!("Invalid lyrics.ovh base URL: {}", self.base_url))?;

        url.path_segments_mut()
            .ok()
            .fatal_ctx(|| format!("lyrics.ovh base URL can't be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v1", artist, title]);

        Ok(url)
    }
}

#[async_trait]
impl LyricsSource for LyricsOvh {
    fn name(&self) -> &'static str {
        "lyrics_ovh"
    }

    async fn fetch(&self, query: &Query) -> Result<Option<LyricsResult>> {
        if query.artist().is_empty() {
            debug!("lyrics.ovh requires the artist name, skipping");
            return Ok(None);
        }

        let url = self.lyrics_url(query.artist(), query.title())?;

        let Some(response) = self
            .http
            .get(url)
            .read_json_or_not_found::<LyricsResponse>()
            .await?
        else {
            return Ok(None);
        };

        if response.lyrics.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(LyricsResult::new(
            query.title(),
            query.artist(),
            &response.lyrics,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::LONG_LYRICS;
    use std::time::Duration;

    fn source(server: &mockito::Server) -> LyricsOvh {
        let http = http::create_client(Duration::from_secs(5)).unwrap();
        LyricsOvh::new(http).with_base_url(server.url())
    }

    #[test_log::test(tokio::test)]
    async fn finds_by_artist_and_title() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/v1/The%20Weeknd/Blinding%20Lights")
            .with_body(serde_json::json!({ "lyrics": LONG_LYRICS }).to_string())
            .create_async()
            .await;

        let query = Query::parse("The Weeknd - Blinding Lights").unwrap();
        let result = source(&server).fetch(&query).await.unwrap().unwrap();

        assert_eq!(result.title(), "Blinding Lights");
        assert_eq!(result.artist(), "The Weeknd");
        assert_eq!(result.lyrics(), LONG_LYRICS);
        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn not_found() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/v1/Nobody/Nothing")
            .with_status(404)
            .with_body(r#"{"error":"No lyrics found"}"#)
            .create_async()
            .await;

        let query = Query::parse("Nobody - Nothing").unwrap();
        assert_eq!(source(&server).fetch(&query).await.unwrap(), None);
    }

    #[test_log::test(tokio::test)]
    async fn skips_queries_without_artist() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let query = Query::parse("Blinding Lights").unwrap();
        assert_eq!(source(&server).fetch(&query).await.unwrap(), None);
        mock.assert_async().await;
    }
}
