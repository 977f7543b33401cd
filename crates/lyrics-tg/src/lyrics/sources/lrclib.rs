use crate::lyrics::{LyricsResult, LyricsSource, Query};
use crate::prelude::*;
use crate::{http, Result};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://lrclib.net";

/// Free, community-driven lyrics database (LRCLIB)
pub(crate) struct Lrclib {
    http: http::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Track {
    track_name: String,
    artist_name: String,

    /// Not present for instrumental tracks
    plain_lyrics: Option<String>,
}

impl Lrclib {
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
impl LyricsSource for Lrclib {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn fetch(&self, query: &Query) -> Result<Option<LyricsResult>> {
        let request = self.http.get(format!("{}/api/search", self.base_url));

        let request = if query.artist().is_empty() {
            request.query(&[("q", query.text())])
        } else {
            request.query(&[
                ("track_name", query.title()),
                ("artist_name", query.artist()),
            ])
        };

        let tracks: Vec<Track> = request.read_json().await?;

        let result = tracks.into_iter().find_map(|track| {
            let lyrics = track.plain_lyrics.filter(|lyrics| !lyrics.trim().is_empty())?;
            Some(LyricsResult::new(&track.track_name, &track.artist_name, &lyrics))
        });

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::LONG_LYRICS;
    use mockito::Matcher;
    use std::time::Duration;

    fn source(server: &mockito::Server) -> Lrclib {
        let http = http::create_client(Duration::from_secs(5)).unwrap();
        Lrclib::new(http).with_base_url(server.url())
    }

    #[test_log::test(tokio::test)]
    async fn searches_by_artist_and_title() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("track_name".into(), "Blinding Lights".into()),
                Matcher::UrlEncoded("artist_name".into(), "The Weeknd".into()),
            ]))
            .with_body(
                serde_json::json!([
                    {
                        "trackName": "Blinding Lights (Instrumental)",
                        "artistName": "The Weeknd",
                        "plainLyrics": null,
                    },
                    {
                        "trackName": "Blinding Lights",
                        "artistName": "The Weeknd",
                        "plainLyrics": LONG_LYRICS,
                    },
                ])
                .to_string(),
            )
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
    async fn free_text_search_without_results() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/search")
            .match_query(Matcher::UrlEncoded("q".into(), "zzzzzznonexistentsong1234".into()))
            .with_body("[]")
            .create_async()
            .await;

        let query = Query::parse("zzzzzznonexistentsong1234").unwrap();
        assert_eq!(source(&server).fetch(&query).await.unwrap(), None);
        mock.assert_async().await;
    }
}
