use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static INIT: Once = Once::new();

/// Install the global subscriber. Logs go to stderr so that stdout stays
/// clean for command output; `--json` switches them to JSON lines.
pub fn init(json: bool) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        let layer = if json {
            fmt::Layer::new()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(layer.with_filter(env_filter))
            .init();
    });
}
