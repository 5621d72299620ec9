//! Tracing configuration module for structured logging
//!
//! Applications configure the subscriber (see [`TracingConfig::init`], only
//! available with the `cli` feature). The library itself only emits spans and
//! events through the [`spans`] and [`events`] helpers.

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact console output for CI environments
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Configuration for tracing output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracingOutput {
    /// Output to stderr (default)
    Console,
    /// Output to a file
    #[cfg(feature = "tracing-files")]
    File(std::path::PathBuf),
}

/// Keeps a non-blocking file writer alive until the process finishes
#[derive(Default)]
pub struct TracingGuard {
    #[cfg(feature = "tracing-files")]
    _worker: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    pub format: TracingFormat,
    pub output: TracingOutput,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            output: TracingOutput::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Set session ID for log correlation
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",  // Default: progress and warnings
            1 => "debug", // -v: device commands and parser decisions
            _ => "trace", // -vv and above
        }
    }

    /// Initialize the global tracing subscriber.
    ///
    /// The returned guard must be held for as long as file output should be
    /// flushed.
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<TracingGuard> {
        use tracing_subscriber::fmt;

        let filter = if let Some(env_filter) = &self.env_filter {
            EnvFilter::try_new(env_filter)?
        } else {
            EnvFilter::try_new(self.verbosity_to_filter())?
        };
        let registry = Registry::default().with(filter);
        #[allow(unused_mut)]
        let mut guard = TracingGuard::default();

        match (&self.format, &self.output) {
            (TracingFormat::Console, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },

            (TracingFormat::Compact, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-json")]
            (TracingFormat::Json, TracingOutput::Console) => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true);
                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-files")]
            (format, TracingOutput::File(path)) => {
                use tracing_appender::{non_blocking, rolling};

                let file_appender = rolling::never(
                    path.parent().unwrap_or_else(|| std::path::Path::new(".")),
                    path.file_name()
                        .unwrap_or_else(|| std::ffi::OsStr::new("ml-testbench.log")),
                );
                let (file_writer, worker) = non_blocking(file_appender);
                guard._worker = Some(worker);

                match format {
                    TracingFormat::Console | TracingFormat::Compact => {
                        let fmt_layer = fmt::layer()
                            .with_ansi(false)
                            .with_writer(file_writer)
                            .compact();
                        registry.with(fmt_layer).try_init()?;
                    },
                    #[cfg(feature = "tracing-json")]
                    TracingFormat::Json => {
                        let fmt_layer = fmt::layer()
                            .json()
                            .with_writer(file_writer)
                            .with_current_span(true)
                            .with_span_list(true);
                        registry.with(fmt_layer).try_init()?;
                    },
                }
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::info!(session_id = %session_id, "Benchmark session started");
        }

        Ok(guard)
    }
}

/// Initialize tracing with CLI-friendly defaults for one benchmark session
#[cfg(feature = "cli")]
pub fn init_cli_tracing(
    verbosity: u8,
    session_id: &str,
    output: TracingOutput,
) -> anyhow::Result<TracingGuard> {
    TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(TracingFormat::Console)
        .with_output(output)
        .with_session_id(session_id)
        .init()
}

/// Span creation helpers for benchmark operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span for one CLI invocation
    pub fn session(session_id: &str, config_path: &std::path::Path) -> Span {
        tracing::span!(
            Level::INFO,
            "session",
            session_id = %session_id,
            config = %config_path.display()
        )
    }

    /// Span for all benchmarks of one workload
    pub fn workload(name: &str, model_name: &str) -> Span {
        tracing::span!(Level::INFO, "workload", name = %name, model = %model_name)
    }

    /// Span for one threads x target combination of the generic runner
    pub fn generic_run(combination: &str) -> Span {
        tracing::span!(Level::INFO, "generic_run", combination = %combination)
    }

    /// Span for the loops of the vendor executor
    pub fn vendor_run(loops: u32) -> Span {
        tracing::span!(Level::INFO, "vendor_run", loops = loops)
    }

    /// Span for file transfers into a remote directory
    pub fn remote_sync(remote_dir: &str) -> Span {
        tracing::span!(Level::DEBUG, "remote_sync", remote_dir = %remote_dir)
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, error};

    /// Log an error with context
    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!(error = %error, context = %context, "Operation failed");
    }

    /// Log the wall time of one device-side run
    pub fn run_timing(operation: &str, duration_ms: u64, exit_code: i32) {
        debug!(
            operation = %operation,
            duration_ms = duration_ms,
            exit_code = exit_code,
            "Run finished"
        );
    }
}
