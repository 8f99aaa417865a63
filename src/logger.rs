//! Logging setup
//!
//! Built on `tracing` and `tracing-subscriber`, with a level per phase.
//!
//! # Example
//! ```ignore
//! use gramlex::logger::{init_with_phases, LogFormat};
//! use gramlex::Phase;
//! use tracing::level_filters::LevelFilter;
//!
//! init_with_phases(LogFormat::Compact, LevelFilter::WARN, &[(Phase::Scanner, LevelFilter::TRACE)])?;
//! ```

use std::io;

use gramlex_config::Phase;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets,
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    Layer,
};

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored, multi-line (development)
    #[default]
    Pretty,
    Compact,
    /// Tool integration
    Json,
}

/// Filter with `default` everywhere and a dedicated level per listed phase
pub fn phase_targets(default: LevelFilter, phases: &[(Phase, LevelFilter)]) -> Targets {
    phases
        .iter()
        .fold(Targets::new().with_default(default), |targets, (phase, level)| {
            targets.with_target(phase.target(), *level)
        })
}

/// Install a global subscriber writing to standard error
pub fn init_logger(format: LogFormat, level: LevelFilter) -> Result<(), TryInitError> {
    init_with_phases(format, level, &[])
}

/// Like [`init_logger`], with per-phase overrides
pub fn init_with_phases(
    format: LogFormat,
    default: LevelFilter,
    phases: &[(Phase, LevelFilter)],
) -> Result<(), TryInitError> {
    let layer = create_format_layer(format, io::stderr).with_filter(phase_targets(default, phases));
    tracing_subscriber::registry().with(layer).try_init()
}

fn create_format_layer<W, F>(format: LogFormat, make_writer: F) -> impl Layer<tracing_subscriber::Registry>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_phase_targets() {
        let targets = phase_targets(LevelFilter::WARN, &[(Phase::Scanner, LevelFilter::TRACE)]);

        assert!(targets.would_enable("gramlex::lexer::scanner", &Level::TRACE));
        assert!(!targets.would_enable("gramlex::walker", &Level::DEBUG));
        assert!(targets.would_enable("gramlex::walker", &Level::WARN));
    }

    #[test]
    fn test_default_format() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
