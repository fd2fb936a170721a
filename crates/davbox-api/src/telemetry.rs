//! Tracing subscriber initialization

use davbox_core::Config;
use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Production emits JSON lines for log shipping; everything else gets a
/// compact console format. `RUST_LOG` overrides the default filter.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "davbox_api=debug,davbox_db=debug,davbox_storage=debug,davbox_processing=debug,tower_http=debug"
            .into()
    });

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(Format::default().compact().with_target(false)),
            )
            .init();
    }
}
