use tracing::Subscriber;
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

fn default_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// Compact human-readable lines; `verbose` lowers this crate to debug.
pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        default_filter("watch_scraper=debug,info")
    } else {
        default_filter("watch_scraper=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn json_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(false)
}

/// JSON lines for runs whose output is collected by another program.
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(default_filter("watch_scraper=info"))
        .with(json_layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_layer_accepts_events() {
        let subscriber = tracing_subscriber::registry().with(json_layer());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(listings = 3, "json event");
        });
    }
}
