//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use scribe_observe::tracing_setup::{LogSettings, init_tracing};
//!
//! // Human-readable logs at `warn`, `RUST_LOG` overrides the directive
//! init_tracing(&LogSettings::new("warn")).unwrap();
//!
//! // JSON logs plus OpenTelemetry export to stdout
//! let settings = LogSettings { json: true, otel: true, ..LogSettings::new("info,scribe=debug") };
//! init_tracing(&settings).unwrap();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// How the process logs.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset or empty.
    pub directive: String,
    /// One JSON object per event instead of human-readable lines.
    pub json: bool,
    /// Bridge spans to OpenTelemetry with a stdout exporter.
    pub otel: bool,
}

impl LogSettings {
    pub fn new(directive: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            json: false,
            otel: false,
        }
    }

    /// The filter to install: `RUST_LOG` when set, otherwise `directive`.
    pub fn env_filter(&self, rust_log: Option<&str>) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        match rust_log {
            Some(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive),
            _ => EnvFilter::try_new(&self.directive),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Log lines always go to stderr so streamed model output on stdout stays
/// clean.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the directive cannot be parsed.
pub fn init_tracing(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let env_filter = settings.env_filter(rust_log.as_deref())?;

    let json_layer = settings.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
    });
    let text_layer = (!settings.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
    });

    let otel_layer = settings.otel.then(|| {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("scribe");
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// No-op when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
