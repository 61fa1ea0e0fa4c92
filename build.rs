/// Build script to embed the license shared secret
/// The secret comes from LICENSE_SHARED_SECRET in the build environment,
/// or from a .env file next to Cargo.toml

const SECRET_KEY: &str = "LICENSE_SHARED_SECRET";

fn main() {
    println!("cargo:rerun-if-env-changed={}", SECRET_KEY);

    // An explicit environment variable wins; rustc sees it through option_env!
    if std::env::var(SECRET_KEY).is_ok() {
        eprintln!("🔧 Embedding shared secret from environment");
        return;
    }

    let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let env_path = std::path::Path::new(&manifest_dir).join(".env");

    // Watch the path even while absent so a .env created later is picked up
    println!("cargo:rerun-if-changed={}", env_path.display());
    if !env_path.exists() {
        return;
    }

    // Read .env file manually (avoid extra dependencies in build script)
    let Ok(contents) = std::fs::read_to_string(&env_path) else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if key.trim() == SECRET_KEY && !value.is_empty() {
                println!("cargo:rustc-env={}={}", SECRET_KEY, value);
                eprintln!("🔧 Embedding shared secret from {}", env_path.display());
            }
        }
    }
}
