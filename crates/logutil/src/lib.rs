//! Utilities for logging.

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    HumanReadable,
    SingleLine,
    Json,
}

/// Configure the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set. Calling this
/// more than once is a no-op, which lets tests call it freely.
pub fn configure_global_logger<W>(default_level: Level, format: LogFormat, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer);

    let _ = match format {
        LogFormat::HumanReadable => builder
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init(),
        LogFormat::SingleLine => builder
            .with_file(true)
            .with_line_number(true)
            .compact()
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Logger setup for tests. Output is captured by the test harness.
pub fn configure_test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .from_env_lossy(),
        )
        .with_test_writer()
        .compact()
        .try_init();
}
