//! Build script for credit-fis
//!
//! Embeds version and target information for the CLI's long version string.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(version) = env::var("CARGO_PKG_VERSION") {
        println!("cargo:rustc-env=CREDIT_FIS_VERSION={}", version);
    }

    // Emit target info
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=CREDIT_FIS_TARGET={}", target);
}
