/// License Verify Binary - one-shot license check
///
/// Verifies the configured license file and exits with:
/// - 0: license valid (expiry date printed on stdout)
/// - 1: license invalid, or verification could not complete
/// - 2: license expired (expiry date printed on stdout)

use std::process::exit;

use license_verify::config::{Config, SharedSecret, load_config};
use license_verify::error::ConfigError;
use license_verify::execution::execute_sync;
use license_verify::verification::Verifier;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    // Configuration is optional; defaults cover the standard deployment
    let (config, load_error) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_logging(&config.log_level);

    match load_error {
        None => info!("using adjacent .config file"),
        Some(ConfigError::Io { path, .. }) => {
            info!(path = %path.display(), "no config file, using defaults");
        }
        Some(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            exit(1);
        }
    }

    let secret = SharedSecret::embedded();
    if secret.is_empty() {
        warn!("built without LICENSE_SHARED_SECRET; no license will verify");
    }

    let verifier = match Verifier::from_config(&config, secret) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("❌ Failed to set up time sources: {}", e);
            exit(1);
        }
    };

    execute_sync(&verifier, &config.license_path);
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
