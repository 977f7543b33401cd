use super::GLOBAL_LABELS;
use crate::config::from_env_or_panic;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use serde::Deserialize;

/// Histogram buckets to measure the distribution of request durations in seconds
const DEFAULT_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Names of all histograms recorded by the bot. They all measure durations.
const DURATION_HISTOGRAMS: &[&str] = &[
    crate::http::HTTP_REQUEST_DURATION_SECONDS,
    crate::lyrics::LYRICS_SOURCE_DURATION_SECONDS,
    crate::lyrics::LYRICS_LOOKUP_DURATION_SECONDS,
];

#[derive(Deserialize)]
struct MetricsConfig {
    /// The prometheus exporter is not started if this isn't set
    metrics_port: Option<u16>,
}

pub fn init_metrics() {
    let config: MetricsConfig = from_env_or_panic("");

    let Some(port) = config.metrics_port else {
        tracing::info!("METRICS_PORT is not set, metrics exporter is disabled");
        return;
    };

    let mut builder = PrometheusBuilder::new().with_http_listener(([0, 0, 0, 0], port));

    for histogram in DURATION_HISTOGRAMS {
        builder = builder
            .set_buckets_for_metric(Matcher::Full((*histogram).to_owned()), DEFAULT_DURATION_BUCKETS)
            .unwrap_or_else(|err| {
                panic!("BUG: histogram `{histogram}` defined empty list of buckets: {err:?}")
            });
    }

    for (key, value) in GLOBAL_LABELS {
        builder = builder.add_global_label(*key, *value);
    }

    builder
        .install()
        .unwrap_or_else(|err| panic!("BUG: failed to initialize the metrics listener: {err:#?}"));
}
