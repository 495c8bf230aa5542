use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a global subscriber printing events up to `level` on stderr.
/// Only the first call installs anything; later calls are no-ops.
pub fn tracing_init(level: Level) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(LevelFilter::from_level(level))
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(%level, "tracing initialised");
    }
}
