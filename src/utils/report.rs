// src/utils/report.rs

//! Run-report helpers on top of the `log` facade.
//!
//! Everything goes through `log::info!` so the CLI's `env_logger` setup
//! decides formatting and filtering.

/// Log a boxed section header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{border}");
    log::info!("  {title}");
    log::info!("{border}");
}

/// Log a step in a multi-stage run.
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("[STEP {step_num}/{total}] {message}");
}

/// Log a titled list of key/value pairs.
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {title}");
    for (key, value) in items {
        log::info!("    {key}: {value}");
    }
}
