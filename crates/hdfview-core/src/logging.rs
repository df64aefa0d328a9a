//! Logging facilities for the HDFView table crates.
//!
//! Everything is instrumented with the `tracing` crate. To see logs, install
//! a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("hdfview_table=trace")
//!     .init();
//! ```
//!
//! Handler construction fallbacks and rejected edits are logged at `debug`;
//! per-call entry and exit of validation and rendering at `trace`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core datatype model target.
    pub const CORE: &str = "hdfview_core";
    /// Member selection filter.
    pub const SELECTION: &str = "hdfview_table::selection";
    /// Column index mapping.
    pub const COLUMN_MAP: &str = "hdfview_table::column_map";
    /// Value handler construction, validation and rendering.
    pub const HANDLER: &str = "hdfview_table::handler";
    /// Enum value to name conversion.
    pub const ENUM_NAMES: &str = "hdfview_table::enum_names";
    /// Table adapter.
    pub const TABLE: &str = "hdfview_table::table";
    /// Performance spans.
    pub const PERF: &str = "hdfview::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used around whole-table rebuilds to measure their duration.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[macro_export]
macro_rules! core_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! core_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // Just ensure it compiles and doesn't panic without a subscriber
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_macros_with_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            core_trace!(value = 1, "trace message");
            core_debug!("debug message");
            let _span = PerfSpan::new("scoped");
        });
    }

    #[test]
    fn test_perf_span_target() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let perf = PerfSpan::new("targeted");
            let target = perf.span.metadata().map(|meta| meta.target());
            assert_eq!(target, Some(targets::PERF));
        });
    }

    #[test]
    fn test_targets_are_namespaced() {
        assert!(targets::HANDLER.starts_with("hdfview_table"));
        assert_eq!(targets::CORE, "hdfview_core");
    }
}
