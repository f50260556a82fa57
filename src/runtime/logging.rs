// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request logging for outbound API calls.
//!
//! Provides structured logging of every HTTP call with timing, status and
//! (redacted) request headers.
//!
//! # Example
//!
//! ```
//! use kubectl_rancher::runtime::{LoggingConfig, RequestLogger};
//!
//! let logger = RequestLogger::with_config(LoggingConfig::verbose());
//! let span = logger.start("GET", "/v3/clusters");
//! logger.finish_success(span, 200);
//! ```

use http::HeaderMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Log level for request logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Trace level - most verbose.
    Trace,
    /// Debug level.
    #[default]
    Debug,
    /// Info level.
    Info,
    /// Warn level.
    Warn,
    /// Error level - only errors.
    Error,
    /// Disabled - no logging.
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Trace => trace!(target: "kubectl_rancher::http", $($arg)+),
            LogLevel::Debug => debug!(target: "kubectl_rancher::http", $($arg)+),
            LogLevel::Info => info!(target: "kubectl_rancher::http", $($arg)+),
            LogLevel::Warn => warn!(target: "kubectl_rancher::http", $($arg)+),
            LogLevel::Error => error!(target: "kubectl_rancher::http", $($arg)+),
            LogLevel::Off => {}
        }
    };
}

/// Configuration for request logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for successful requests.
    pub success_level: LogLevel,
    /// Log level for failed requests.
    pub error_level: LogLevel,
    /// Whether to log request headers.
    pub log_headers: bool,
    /// Header names whose values are never logged.
    pub sensitive_headers: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            success_level: LogLevel::Debug,
            error_level: LogLevel::Debug,
            log_headers: false,
            sensitive_headers: vec!["authorization".to_string(), "cookie".to_string()],
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success log level.
    #[must_use]
    pub fn with_success_level(mut self, level: LogLevel) -> Self {
        self.success_level = level;
        self
    }

    /// Set the error log level.
    #[must_use]
    pub fn with_error_level(mut self, level: LogLevel) -> Self {
        self.error_level = level;
        self
    }

    /// Enable or disable header logging.
    #[must_use]
    pub fn with_headers(mut self, enabled: bool) -> Self {
        self.log_headers = enabled;
        self
    }

    /// Create a verbose configuration for debugging.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            success_level: LogLevel::Info,
            error_level: LogLevel::Warn,
            log_headers: true,
            ..Self::default()
        }
    }

    fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(name))
    }
}

/// An in-flight request being timed.
#[derive(Debug)]
pub struct RequestSpan {
    method: String,
    path: String,
    start: Instant,
}

impl RequestSpan {
    /// HTTP method of the request.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path relative to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Logs the start and outcome of each request.
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    config: LoggingConfig,
}

impl RequestLogger {
    /// Create a new request logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request logger with custom configuration.
    #[must_use]
    pub fn with_config(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Start tracking a request.
    #[must_use]
    pub fn start(&self, method: &str, path: &str) -> RequestSpan {
        log_at!(self.config.success_level, method, path, "sending request");
        RequestSpan {
            method: method.to_string(),
            path: path.to_string(),
            start: Instant::now(),
        }
    }

    /// Log outgoing headers, with sensitive values redacted.
    pub fn log_headers(&self, headers: &HeaderMap) {
        if !self.config.log_headers {
            return;
        }
        let headers = self.describe_headers(headers);
        log_at!(self.config.success_level, %headers, "request headers");
    }

    /// Finish tracking a request (success).
    pub fn finish_success(&self, span: RequestSpan, status: u16) {
        let elapsed = span.start.elapsed();
        log_at!(
            self.config.success_level,
            method = %span.method,
            path = %span.path,
            status,
            ?elapsed,
            "request completed"
        );
    }

    /// Finish tracking a request (failure).
    pub fn finish_failure(&self, span: RequestSpan, error: &dyn fmt::Display) {
        let elapsed = span.start.elapsed();
        log_at!(
            self.config.error_level,
            method = %span.method,
            path = %span.path,
            %error,
            ?elapsed,
            "request failed"
        );
    }

    /// Render headers as `name=value` pairs, redacting sensitive ones.
    #[must_use]
    pub fn describe_headers(&self, headers: &HeaderMap) -> String {
        let parts: Vec<String> = headers
            .iter()
            .map(|(name, value)| {
                if self.config.is_sensitive(name.as_str()) {
                    format!("{}=[REDACTED]", name)
                } else {
                    format!("{}={:?}", name, value)
                }
            })
            .collect();
        parts.join(", ")
    }
}
