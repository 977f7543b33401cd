//! Adapters for the concrete lyrics providers. None of them is assumed to be
//! permanently available, so the set and order of the enabled ones is
//! configured at runtime.

mod genius;
mod lrclib;
mod lyrics_ovh;
mod web_search;

use super::{Config, LyricsSource, SourceKind};
use crate::http;

pub(crate) fn build_sources(config: &Config, http: http::Client) -> Vec<Box<dyn LyricsSource>> {
    config
        .sources
        .iter()
        .map(|kind| -> Box<dyn LyricsSource> {
            let http = http.clone();
            match kind {
                SourceKind::GeniusApi => {
                    Box::new(genius::GeniusApi::new(http, config.genius_token.clone()))
                }
                SourceKind::GeniusWeb => Box::new(genius::GeniusWeb::new(http)),
                SourceKind::Lrclib => Box::new(lrclib::Lrclib::new(http)),
                SourceKind::LyricsOvh => Box::new(lyrics_ovh::LyricsOvh::new(http)),
                SourceKind::WebSearch => Box::new(web_search::WebSearch::new(http)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn sources_follow_configured_order() {
        let http = http::create_client(Duration::from_secs(5)).unwrap();
        let config = Config {
            genius_token: None,
            sources: vec![SourceKind::WebSearch, SourceKind::Lrclib, SourceKind::GeniusApi],
            http_timeout_secs: 5,
            min_lyrics_len: 50,
        };

        let names: Vec<_> = build_sources(&config, http)
            .iter()
            .map(|source| source.name())
            .collect();

        assert_eq!(names, ["web_search", "lrclib", "genius_api"]);
    }

    #[test]
    fn source_names_match_config_names() {
        let http = http::create_client(Duration::from_secs(5)).unwrap();
        let config = Config {
            genius_token: None,
            sources: SourceKind::DEFAULT_ORDER.to_vec(),
            http_timeout_secs: 5,
            min_lyrics_len: 50,
        };

        for (source, kind) in build_sources(&config, http).iter().zip(config.sources) {
            assert_eq!(source.name(), <&str>::from(kind));
        }
    }
}
