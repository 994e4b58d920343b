use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter directive for the given verbosity flags.
///
/// `-q` wins over `-v`. Without flags only warnings are shown.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the flags.
pub fn init(verbose: u8, quiet: bool, color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(verbose > 1);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0, false), "warn");
        assert_eq!(default_directive(1, false), "debug");
        assert_eq!(default_directive(3, false), "trace");
        assert_eq!(default_directive(2, true), "error");
    }
}
