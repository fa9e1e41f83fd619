//! Compile-time build metadata, embedded by build.rs

use serde::Serialize;

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// UTC build time, `unknown` when built without build.rs
pub const BUILD_TIMESTAMP: &str = match option_env!("NUTRIMIND_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Cargo profile (`debug` or `release`)
pub const BUILD_PROFILE: &str = match option_env!("NUTRIMIND_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub profile: &'static str,
    pub built_at: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            profile: BUILD_PROFILE,
            built_at: BUILD_TIMESTAMP,
        }
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  NutriMind {} ({})", info.version, info.profile);
    eprintln!("  Built: {}", info.built_at);
    eprintln!("  {}", env!("CARGO_PKG_DESCRIPTION"));
    eprintln!("===============================================");
}
