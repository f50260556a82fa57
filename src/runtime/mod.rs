// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime utilities for observability.
//!
//! Requests are executed exactly once; this module only records what
//! happened to them.

mod logging;

pub use logging::{LogLevel, LoggingConfig, RequestLogger, RequestSpan};
