use super::{fetch_song_page, first_song, Envelope, SearchHit};
use crate::lyrics::{LyricsResult, LyricsSource, LyricsSourceError, Query};
use crate::prelude::*;
use crate::{err, http, Result};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.genius.com";

/// Official Genius API. It requires an access token, and it gives us only
/// the link to the song page, the lyrics are scraped from the page itself.
pub(crate) struct GeniusApi {
    http: http::Client,
    token: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

impl GeniusApi {
    pub(crate) fn new(http: http::Client, token: Option<String>) -> Self {
        Self {
            http,
            token,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LyricsSource for GeniusApi {
    fn name(&self) -> &'static str {
        "genius_api"
    }

    async fn fetch(&self, query: &Query) -> Result<Option<LyricsResult>> {
        let Some(token) = &self.token else {
            return Err(err!(LyricsSourceError::MissingToken { name: self.name() }));
        };

        let response: Envelope<SearchResponse> = self
            .http
            .get(format!("{}/search", self.base_url))
            .bearer_auth(token)
            .query(&[("q", query.text())])
            .read_json()
            .await?;

        let Some(song) = first_song(response.response.hits, query) else {
            return Ok(None);
        };

        fetch_song_page(&self.http, song).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::LONG_LYRICS;
    use crate::ErrorKind;
    use assert_matches::assert_matches;
    use mockito::Matcher;
    use std::time::Duration;

    fn source(server: &mockito::Server, token: Option<&str>) -> GeniusApi {
        let http = http::create_client(Duration::from_secs(5)).unwrap();
        GeniusApi::new(http, token.map(ToOwned::to_owned)).with_base_url(server.url())
    }

    #[test_log::test(tokio::test)]
    async fn finds_song_via_api() {
        let mut server = mockito::Server::new_async().await;

        let search = server
            .mock("GET", "/search")
            .match_header("authorization", "Bearer secret")
            .match_query(Matcher::UrlEncoded("q".into(), "The Weeknd - Blinding Lights".into()))
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "response": {
                        "hits": [{
                            "type": "song",
                            "result": {
                                "url": format!("{}/The-weeknd-blinding-lights-lyrics", server.url()),
                                "title": "Blinding Lights",
                                "primary_artist": { "name": "The Weeknd" },
                            },
                        }],
                    },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = server
            .mock("GET", "/The-weeknd-blinding-lights-lyrics")
            .with_body(format!(
                r#"<div data-lyrics-container="true">{}</div>"#,
                LONG_LYRICS.replace('\n', "<br/>")
            ))
            .create_async()
            .await;

        let query = Query::parse("The Weeknd - Blinding Lights").unwrap();
        let result = source(&server, Some("secret"))
            .fetch(&query)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.title(), "Blinding Lights");
        assert_eq!(result.artist(), "The Weeknd");
        assert_eq!(result.lyrics(), LONG_LYRICS);

        search.assert_async().await;
        page.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn no_hits() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(r#"{"response":{"hits":[]}}"#)
            .create_async()
            .await;

        let query = Query::parse("zzzzzznonexistentsong1234").unwrap();
        let result = source(&server, Some("secret")).fetch(&query).await.unwrap();
        assert_eq!(result, None);
    }

    #[test_log::test(tokio::test)]
    async fn missing_token() {
        let server = mockito::Server::new_async().await;
        let query = Query::parse("Blinding Lights").unwrap();
        let err = source(&server, None).fetch(&query).await.unwrap_err();

        assert_matches!(
            err.kind(),
            ErrorKind::LyricsSource {
                source: LyricsSourceError::MissingToken { name: "genius_api" }
            }
        );
    }
}
