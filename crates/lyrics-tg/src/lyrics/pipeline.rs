use super::{sources, Config, LyricsResult, LyricsSource, Query};
use super::{LYRICS_LOOKUP_DURATION_SECONDS, LYRICS_SOURCE_DURATION_SECONDS};
use crate::prelude::*;
use std::time::Instant;

const LYRICS_SOURCE_ATTEMPTS_TOTAL: &str = "lyrics_source_attempts_total";

/// Tries the lyrics sources one by one in the configured order until one
/// of them returns sane lyrics.
pub(crate) struct LyricsPipeline {
    sources: Vec<Box<dyn LyricsSource>>,
    min_lyrics_len: usize,
}

/// Outcome of a single source attempt
#[derive(Debug, Clone, Copy, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum Attempt {
    Found,
    NotFound,
    TooShort,
    Error,
}

impl LyricsPipeline {
    pub(crate) fn new(sources: Vec<Box<dyn LyricsSource>>, min_lyrics_len: usize) -> Self {
        Self {
            sources,
            min_lyrics_len,
        }
    }

    pub(crate) fn from_config(config: &Config, http: crate::http::Client) -> Self {
        Self::new(sources::build_sources(config, http), config.min_lyrics_len)
    }

    /// Returns [`None`] if none of the sources could find the lyrics.
    /// Errors of the individual sources are logged and not propagated.
    #[instrument(skip_all, fields(query = query.text()))]
    pub(crate) async fn lookup(&self, query: &Query) -> Option<LyricsResult> {
        let start = Instant::now();

        let mut found = None;
        for source in &self.sources {
            if let Some(result) = self.try_source(source.as_ref(), query).await {
                found = Some((source.name(), result));
                break;
            }
        }

        let elapsed = start.elapsed();
        let (source, result) = match found {
            Some((source, result)) => (source, Some(result)),
            None => ("{none}", None),
        };

        metrics::histogram!(LYRICS_LOOKUP_DURATION_SECONDS, "source" => source)
            .record(elapsed.as_secs_f64());

        info!(
            source,
            duration = tracing_duration(elapsed),
            found = result.is_some(),
            "Lyrics lookup finished"
        );

        result
    }

    async fn try_source(&self, source: &dyn LyricsSource, query: &Query) -> Option<LyricsResult> {
        let name = source.name();

        let (result, elapsed) = source
            .fetch(query)
            .instrument(info_span!("source", name))
            .with_duration()
            .await;

        let duration = tracing_duration(elapsed);

        let (attempt, result) = match result {
            Ok(Some(result)) if result.lyrics().chars().count() < self.min_lyrics_len => {
                warn!(
                    source = name,
                    duration,
                    lyrics_len = result.lyrics().chars().count(),
                    min_lyrics_len = self.min_lyrics_len,
                    "Lyrics source returned suspiciously short lyrics",
                );
                (Attempt::TooShort, None)
            }
            Ok(Some(result)) => {
                debug!(source = name, duration, "Lyrics source found the song");
                (Attempt::Found, Some(result))
            }
            Ok(None) => {
                debug!(source = name, duration, "Lyrics source doesn't know the song");
                (Attempt::NotFound, None)
            }
            Err(err) => {
                warn!(
                    source = name,
                    duration,
                    err = tracing_err(&err),
                    "Lyrics source failed"
                );
                (Attempt::Error, None)
            }
        };

        let attempt: &'static str = attempt.into();

        metrics::counter!(
            LYRICS_SOURCE_ATTEMPTS_TOTAL,
            "source" => name,
            "result" => attempt
        )
        .increment(1);

        metrics::histogram!(
            LYRICS_SOURCE_DURATION_SECONDS,
            "source" => name,
            "result" => attempt
        )
        .record(elapsed.as_secs_f64());

        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{fatal, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) const LONG_LYRICS: &str = "I've been tryna call\n\
        I've been on my own for long enough\n\
        Maybe you can show me how to love, maybe\n\
        I'm going through withdrawals";

    #[derive(Clone, Copy)]
    pub(crate) enum Behavior {
        Found(&'static str),
        NotFound,
        Fail,
    }

    /// Source with canned output that counts how many times it was called
    pub(crate) struct MockSource {
        name: &'static str,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        pub(crate) fn new(name: &'static str, behavior: Behavior) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                name,
                behavior,
                calls: calls.clone(),
            };
            (source, calls)
        }
    }

    #[async_trait]
    impl LyricsSource for MockSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, query: &Query) -> Result<Option<LyricsResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Found(lyrics) => Ok(Some(LyricsResult::new(
                    query.title(),
                    query.artist(),
                    lyrics,
                ))),
                Behavior::NotFound => Ok(None),
                Behavior::Fail => Err(fatal!("{} is down", self.name)),
            }
        }
    }

    fn pipeline(behaviors: &[Behavior]) -> (LyricsPipeline, Vec<Arc<AtomicUsize>>) {
        const NAMES: [&str; 4] = ["first", "second", "third", "fourth"];

        let (sources, calls): (Vec<_>, Vec<_>) = behaviors
            .iter()
            .zip(NAMES)
            .map(|(&behavior, name)| {
                let (source, calls) = MockSource::new(name, behavior);
                (Box::new(source) as Box<dyn LyricsSource>, calls)
            })
            .unzip();

        (LyricsPipeline::new(sources, 50), calls)
    }

    fn call_counts(calls: &[Arc<AtomicUsize>]) -> Vec<usize> {
        calls.iter().map(|calls| calls.load(Ordering::SeqCst)).collect()
    }

    #[test_log::test(tokio::test)]
    async fn first_success_short_circuits() {
        let (pipeline, calls) = pipeline(&[
            Behavior::Found(LONG_LYRICS),
            Behavior::Found(LONG_LYRICS),
            Behavior::Fail,
        ]);

        let query = Query::parse("The Weeknd - Blinding Lights").unwrap();
        let result = pipeline.lookup(&query).await.unwrap();

        assert_eq!(result.title(), "Blinding Lights");
        assert_eq!(result.artist(), "The Weeknd");
        assert_eq!(result.lyrics(), LONG_LYRICS);
        assert_eq!(call_counts(&calls), [1, 0, 0]);
    }

    #[test_log::test(tokio::test)]
    async fn failures_fall_through_to_next_source() {
        let (pipeline, calls) = pipeline(&[
            Behavior::Fail,
            Behavior::NotFound,
            Behavior::Found("too short"),
            Behavior::Found(LONG_LYRICS),
        ]);

        let query = Query::parse("Blinding Lights").unwrap();
        let result = pipeline.lookup(&query).await.unwrap();

        assert_eq!(result.lyrics(), LONG_LYRICS);
        assert_eq!(result.artist(), "Unknown");
        assert_eq!(call_counts(&calls), [1, 1, 1, 1]);
    }

    #[test_log::test(tokio::test)]
    async fn all_sources_fail() {
        let (pipeline, calls) = pipeline(&[
            Behavior::Fail,
            Behavior::NotFound,
            Behavior::Found("short"),
        ]);

        let query = Query::parse("zzzzzznonexistentsong1234").unwrap();
        assert_eq!(pipeline.lookup(&query).await, None);
        assert_eq!(call_counts(&calls), [1, 1, 1]);
    }

    #[test_log::test(tokio::test)]
    async fn no_sources() {
        let (pipeline, _) = pipeline(&[]);
        let query = Query::parse("anything").unwrap();
        assert_eq!(pipeline.lookup(&query).await, None);
    }
}
