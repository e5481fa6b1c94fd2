use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Sends plain-text diagnostics to stderr so they never end up in an SRT
/// document written to stdout. Only warnings are shown unless `TXT2SRT_LOG`
/// asks for more, e.g. `TXT2SRT_LOG=trace` to see why lines were not treated
/// as timestamps.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var("TXT2SRT_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_ignored() {
        init();
        init();
    }
}
