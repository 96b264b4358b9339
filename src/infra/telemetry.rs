use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::manager::METRIC_LIST_FETCH;
use crate::application::query_cache::{
    METRIC_QUERY_CACHE_EVICT, METRIC_QUERY_CACHE_HIT, METRIC_QUERY_CACHE_INVALIDATE,
    METRIC_QUERY_CACHE_MISS,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_QUERY_CACHE_HIT,
            Unit::Count,
            "Listings served from the query cache."
        );
        describe_counter!(
            METRIC_QUERY_CACHE_MISS,
            Unit::Count,
            "Listing lookups that had to go to the remote resource."
        );
        describe_counter!(
            METRIC_QUERY_CACHE_EVICT,
            Unit::Count,
            "Cached listings evicted due to capacity."
        );
        describe_counter!(
            METRIC_QUERY_CACHE_INVALIDATE,
            Unit::Count,
            "Cached listings dropped after a successful mutation."
        );
        describe_counter!(
            METRIC_LIST_FETCH,
            Unit::Count,
            "Completed listing fetches, labelled by outcome."
        );
    });
}
