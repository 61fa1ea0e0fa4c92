/// Configuration module - Verifier settings and the embedded shared secret
pub mod schema;
pub mod loader;
pub mod embedded;

pub use schema::{Config, TimeFormat, TimeSourceConfig};
pub use loader::{load_config, load_config_from};
pub use embedded::SharedSecret;
