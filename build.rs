//! Build script for NutriMind
//!
//! Embeds the build time and cargo profile.

fn main() {
    println!("cargo:rerun-if-changed=src");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=NUTRIMIND_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=NUTRIMIND_BUILD_PROFILE={}", profile);
}
