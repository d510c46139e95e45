//! Logging setup shared by embedders and the test suite.

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Configure env_logger: warnings from dependencies, info (or debug when
/// `verbose`) from this crate. Safe to call more than once; later calls are
/// no-ops.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            match record.level() {
                Level::Warn => writeln!(buf, "[{} {}] {}", name, "WARN".yellow(), record.args()),
                Level::Error => writeln!(buf, "[{} {}] {}", name, "ERROR".red(), record.args()),
                _ => writeln!(buf, "[{}] {}", name, record.args()),
            }
        })
        .try_init();
}
