//! Tracing subscriber setup for the CLI and server.
//!
//! Logs go to stderr so `build` and `theme` output on stdout stays clean.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is unset.
///
/// `quiet` wins over `verbose`. Request tracing from tower-http only shows
/// up from `-v` on.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "lenscraft=error";
    }
    match verbose {
        0 => "lenscraft=info",
        1 => "lenscraft=debug,tower_http=debug",
        _ => "lenscraft=trace,tower_http=trace",
    }
}

/// Initialize the global subscriber.
///
/// | Mode | TTY | Output |
/// |------|-----|--------|
/// | JSON | any | JSON lines |
/// | Human | yes | colored |
/// | Human | no | compact, no ANSI |
pub fn init_logging(json: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else if io::stderr().is_terminal() {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .compact()
            .with_writer(io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_parse() {
        for (verbose, quiet) in [(0, false), (1, false), (2, false), (5, false), (2, true)] {
            let directive = default_directive(verbose, quiet);
            assert!(EnvFilter::try_new(directive).is_ok(), "{directive}");
        }
    }

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(default_directive(3, true), "lenscraft=error");
        assert_eq!(default_directive(0, false), "lenscraft=info");
    }
}
