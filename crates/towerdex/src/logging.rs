//! Log setup for the binary.
//!
//! Logs go to stderr so they never mix with command output. `RUST_LOG`
//! takes precedence over `-v`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level for a `-v` count: warn, info, debug, then trace.
pub fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter directives for a `-v` count, scoped to this workspace's crates.
pub fn directives(verbose: u8) -> String {
    let level = level_for(verbose).to_string().to_lowercase();
    format!("warn,towerdex={level},towerdex_catalog={level}")
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(5), Level::TRACE);
    }

    #[test]
    fn directives_cover_both_crates() {
        assert_eq!(
            directives(2),
            "warn,towerdex=debug,towerdex_catalog=debug"
        );
        assert!(EnvFilter::try_new(directives(0)).is_ok());
    }
}
