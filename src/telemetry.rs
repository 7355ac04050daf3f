use std::io;

use anyhow::{anyhow, Context, Result};
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::UtcTime},
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_LEVEL: &str = "PHOTO_GALLERY_LOG_LEVEL";
const LOG_FORMAT: &str = "PHOTO_GALLERY_LOG_FORMAT";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_environment() -> Self {
        match std::env::var(LOG_FORMAT) {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

pub(crate) fn init() -> Result<()> {
    let env_filter = env_filter_merge_from_environment("info,sqlx=warn", LOG_LEVEL)?;

    subscriber(env_filter, LogFormat::from_environment())
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    Ok(())
}

fn subscriber(
    env_filter: EnvFilter,
    format: LogFormat,
) -> impl Subscriber + Send + Sync + 'static {
    let text_layer = (format == LogFormat::Text).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_timer(UtcTime::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
    });
    let json_layer = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_timer(UtcTime::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
}

fn env_filter_merge_from_environment(
    default_directives: &'static str,
    env_var: &'static str,
) -> Result<EnvFilter> {
    let filter = EnvFilter::builder()
        .parse(default_directives)
        .with_context(|| anyhow!("Default directives were invalid: {default_directives}"))?;

    Ok(merge_directives(filter, std::env::var(env_var).ok().as_deref()))
}

fn merge_directives(mut filter: EnvFilter, env_value: Option<&str>) -> EnvFilter {
    if let Some(env_value) = env_value {
        for env_directive in env_value.split(',') {
            match env_directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("WARN ignoring log directive: {env_directive:?}: {err}"),
            }
        }
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_directives_extend_defaults() {
        let filter = EnvFilter::builder().parse("info").unwrap();
        let filter = merge_directives(filter, Some("photo_gallery=debug,=bogus=="));
        assert!(filter.to_string().contains("photo_gallery=debug"));
    }

    #[test]
    fn both_log_formats_build_a_subscriber() {
        for format in [LogFormat::Text, LogFormat::Json] {
            let filter = EnvFilter::builder().parse("info").unwrap();
            tracing::subscriber::with_default(subscriber(filter, format), || {
                tracing::info_span!("request", format = ?format).in_scope(|| {
                    tracing::info!("formatted");
                });
            });
        }
    }
}
