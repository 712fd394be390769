/*!
 * Log setup for the blobfs binary
 */

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is not set
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("blobfs={}", default_level(verbose))));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
