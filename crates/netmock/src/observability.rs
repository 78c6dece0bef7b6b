//! Logging setup for test binaries.
//!
//! The library only emits `tracing` events; it never installs a subscriber
//! on its own. Test suites opt in with [`init_test_logging`].

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "NETMOCK_LOG";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install a subscriber that writes through the test harness's captured output.
///
/// Uses `try_init()`, so calling it from every test is harmless.
pub fn init_test_logging() {
    init_logging(LogFormat::Human);
}

pub fn init_logging(format: LogFormat) {
    let filter = env_filter();
    match format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_test_writer()
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_test_writer()
                .try_init();
        }
    }
}
