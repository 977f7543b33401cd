use super::{fetch_song_page, first_song, Envelope, SearchHit};
use crate::lyrics::{LyricsResult, LyricsSource, Query};
use crate::prelude::*;
use crate::{http, Result};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://genius.com";

/// The search used by the Genius website. It doesn't require a token.
pub(crate) struct GeniusWeb {
    http: http::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct MultiSearchResponse {
    sections: Vec<Section>,
}

#[derive(Deserialize)]
struct Section {
    #[serde(rename = "type")]
    kind: String,
    hits: Vec<SearchHit>,
}

impl GeniusWeb {
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
}

#[async_trait]
impl LyricsSource for GeniusWeb {
    fn name(&self) -> &'static str {
        "genius_web"
    }

    async fn fetch(&self, query: &Query) -> Result<Option<LyricsResult>> {
        let response: Envelope<MultiSearchResponse> = self
            .http
            .get(format!("{}/api/search/multi", self.base_url))
            .query(&[("q", query.text())])
            .read_json()
            .await?;

        let hits = response
            .response
            .sections
            .into_iter()
            .filter(|section| section.kind == "song")
            .flat_map(|section| section.hits);

        let Some(song) = first_song(hits, query) else {
            return Ok(None);
        };

        fetch_song_page(&self.http, song).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::LONG_LYRICS;
    use mockito::Matcher;
    use std::time::Duration;

    fn source(server: &mockito::Server) -> GeniusWeb {
        let http = http::create_client(Duration::from_secs(5)).unwrap();
        GeniusWeb::new(http).with_base_url(server.url())
    }

    #[test_log::test(tokio::test)]
    async fn finds_song_among_other_sections() {
        let mut server = mockito::Server::new_async().await;
        let song_url = format!("{}/The-weeknd-blinding-lights-lyrics", server.url());

        let _search = server
            .mock("GET", "/api/search/multi")
            .match_query(Matcher::UrlEncoded("q".into(), "Blinding Lights".into()))
            .with_body(
                serde_json::json!({
                    "response": {
                        "sections": [
                            {
                                "type": "top_hit",
                                "hits": [{
                                    "type": "artist",
                                    "result": {
                                        "name": "The Weeknd",
                                        "url": format!("{}/artists/The-weeknd", server.url()),
                                    },
                                }],
                            },
                            {
                                "type": "album",
                                "hits": [{
                                    "type": "album",
                                    "result": {
                                        "name": "After Hours",
                                        "full_title": "After Hours by The Weeknd",
                                        "artist": { "name": "The Weeknd" },
                                    },
                                }],
                            },
                            {
                                "type": "user",
                                "hits": [{
                                    "type": "user",
                                    "result": { "login": "weeknd_fan" },
                                }],
                            },
                            {
                                "type": "song",
                                "hits": [{
                                    "type": "song",
                                    "result": {
                                        "url": song_url,
                                        "title": "Blinding Lights",
                                        "primary_artist": { "name": "The Weeknd" },
                                    },
                                }],
                            },
                        ],
                    },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let _page = server
            .mock("GET", "/The-weeknd-blinding-lights-lyrics")
            .with_body(format!(
                r#"<script type="application/ld+json">{}</script>"#,
                serde_json::json!({ "lyrics": { "text": LONG_LYRICS } })
            ))
            .create_async()
            .await;

        let query = Query::parse("Blinding Lights").unwrap();
        let result = source(&server).fetch(&query).await.unwrap().unwrap();

        assert_eq!(result.title(), "Blinding Lights");
        assert_eq!(result.artist(), "The Weeknd");
        assert_eq!(result.lyrics(), LONG_LYRICS);
    }

    #[test_log::test(tokio::test)]
    async fn song_page_not_found() {
        let mut server = mockito::Server::new_async().await;

        let _search = server
            .mock("GET", "/api/search/multi")
            .match_query(Matcher::Any)
            .with_body(
                serde_json::json!({
                    "response": {
                        "sections": [{
                            "type": "song",
                            "hits": [{
                                "type": "song",
                                "result": {
                                    "url": format!("{}/gone-lyrics", server.url()),
                                    "title": "Gone",
                                    "primary_artist": { "name": "Nobody" },
                                },
                            }],
                        }],
                    },
                })
                .to_string(),
            )
            .create_async()
            .await;

        let _page = server
            .mock("GET", "/gone-lyrics")
            .with_status(404)
            .create_async()
            .await;

        let query = Query::parse("Gone").unwrap();
        assert_eq!(source(&server).fetch(&query).await.unwrap(), None);
    }
}
