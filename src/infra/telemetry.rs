use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::notes::{TRANSLATION_CALLS_TOTAL, TRANSLATION_MS};
use crate::cache::{CACHE_ERROR_TOTAL, CACHE_EVICT_TOTAL, CACHE_HIT_TOTAL, CACHE_MISS_TOTAL};
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
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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

/// Register descriptions for every metric the service emits.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            CACHE_HIT_TOTAL,
            Unit::Count,
            "Cache lookups answered from the cache, labelled by key kind."
        );
        describe_counter!(
            CACHE_MISS_TOTAL,
            Unit::Count,
            "Cache lookups that fell through to the store, labelled by key kind."
        );
        describe_counter!(
            CACHE_ERROR_TOTAL,
            Unit::Count,
            "Cache operations that failed and were degraded, labelled by operation."
        );
        describe_counter!(
            CACHE_EVICT_TOTAL,
            Unit::Count,
            "In-memory cache evictions due to capacity."
        );
        describe_counter!(
            TRANSLATION_CALLS_TOTAL,
            Unit::Count,
            "Translation provider calls, labelled by result."
        );
        describe_histogram!(
            TRANSLATION_MS,
            Unit::Milliseconds,
            "Translation provider latency in milliseconds."
        );
    });
}
