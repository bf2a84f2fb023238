//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `heirloom_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("heirloom_core ping={}", heirloom_core::ping());
    println!("heirloom_core version={}", heirloom_core::core_version());
}
