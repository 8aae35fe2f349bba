// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic sinks for the SDP line decoder.
//!
//! The decoder never fails on recoverable conditions (a line skipped in
//! relaxed mode, a field replaced by its default, a value outside the
//! recommended set). Those conditions are only visible through the
//! [`ParseObserver`] installed here or carried by the parser configuration.
//!
//! # Example
//! ```
//! use sdp_observe::{parse_observer, set_parse_observer, TracingParseObserver};
//! use std::sync::Arc;
//!
//! set_parse_observer(Arc::new(TracingParseObserver));
//! parse_observer().on_unknown_line("x", 4);
//! ```

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::Level;

/// Sink for decoder diagnostics.
///
/// `field` and `tag` are low-cardinality identifiers ("connection.address",
/// "x"). `value`, `discarded` and `substituted` come from untrusted input and
/// should not be used as metric labels.
pub trait ParseObserver: Send + Sync + 'static {
    /// A line was dropped in relaxed mode because its type is not allowed at
    /// this position.
    fn on_line_skipped(&self, line: usize, received: &str, expected: &str);
    /// A field failed to decode and its default was substituted.
    fn on_field_recovered(&self, field: &str, discarded: &str, substituted: &str, line: usize);
    /// A value decoded but is outside the protocol's recommended set.
    fn on_non_standard_value(&self, field: &str, value: &str, line: usize);
    /// A line with an unrecognized type tag was ignored.
    fn on_unknown_line(&self, tag: &str, line: usize);
    /// A description was fully decoded.
    fn on_parse_complete(&self, lines: usize, media: usize);
}

/// Observer that drops every event.
#[derive(Debug, Default)]
pub struct NoopParseObserver;

impl ParseObserver for NoopParseObserver {
    fn on_line_skipped(&self, _line: usize, _received: &str, _expected: &str) {}
    fn on_field_recovered(&self, _field: &str, _discarded: &str, _substituted: &str, _line: usize) {}
    fn on_non_standard_value(&self, _field: &str, _value: &str, _line: usize) {}
    fn on_unknown_line(&self, _tag: &str, _line: usize) {}
    fn on_parse_complete(&self, _lines: usize, _media: usize) {}
}

static PARSE_OBSERVER: OnceCell<Arc<dyn ParseObserver>> = OnceCell::new();
static TRACING_PARSE_OBSERVER: TracingParseObserver = TracingParseObserver;

/// Installs the process-wide parse observer.
///
/// Returns `true` if the observer was installed, or `false` if one was
/// already configured.
pub fn set_parse_observer(observer: Arc<dyn ParseObserver>) -> bool {
    PARSE_OBSERVER.set(observer).is_ok()
}

/// Returns the installed parse observer, falling back to [`TracingParseObserver`].
pub fn parse_observer() -> &'static dyn ParseObserver {
    PARSE_OBSERVER
        .get()
        .map(|arc| arc.as_ref())
        .unwrap_or(&TRACING_PARSE_OBSERVER)
}

/// Creates a tracing span for one decode run.
pub fn span_with_mode(name: &'static str, mode: &str) -> tracing::Span {
    tracing::span!(Level::DEBUG, "sdp_parse", op = name, mode = mode)
}

/// Observer that logs via `tracing`.
#[derive(Debug, Default)]
pub struct TracingParseObserver;

impl ParseObserver for TracingParseObserver {
    fn on_line_skipped(&self, line: usize, received: &str, expected: &str) {
        tracing::warn!(line, received, expected, "skipping line out of order");
    }

    fn on_field_recovered(&self, field: &str, discarded: &str, substituted: &str, line: usize) {
        tracing::info!(field, discarded, substituted, line, "field replaced by default");
    }

    fn on_non_standard_value(&self, field: &str, value: &str, line: usize) {
        tracing::info!(field, value, line, "non-standard value");
    }

    fn on_unknown_line(&self, tag: &str, line: usize) {
        tracing::debug!(tag, line, "ignoring unknown line type");
    }

    fn on_parse_complete(&self, lines: usize, media: usize) {
        tracing::debug!(lines, media, "description decoded");
    }
}

/// One event captured by [`RecordingParseObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    LineSkipped {
        line: usize,
        received: String,
        expected: String,
    },
    FieldRecovered {
        field: String,
        discarded: String,
        substituted: String,
        line: usize,
    },
    NonStandardValue {
        field: String,
        value: String,
        line: usize,
    },
    UnknownLine {
        tag: String,
        line: usize,
    },
    ParseComplete {
        lines: usize,
        media: usize,
    },
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingParseObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingParseObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events seen so far.
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    /// Removes and returns the events seen so far.
    pub fn take(&self) -> Vec<ObservedEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, event: ObservedEvent) {
        self.events.lock().push(event);
    }
}

impl ParseObserver for RecordingParseObserver {
    fn on_line_skipped(&self, line: usize, received: &str, expected: &str) {
        self.record(ObservedEvent::LineSkipped {
            line,
            received: received.to_string(),
            expected: expected.to_string(),
        });
    }

    fn on_field_recovered(&self, field: &str, discarded: &str, substituted: &str, line: usize) {
        self.record(ObservedEvent::FieldRecovered {
            field: field.to_string(),
            discarded: discarded.to_string(),
            substituted: substituted.to_string(),
            line,
        });
    }

    fn on_non_standard_value(&self, field: &str, value: &str, line: usize) {
        self.record(ObservedEvent::NonStandardValue {
            field: field.to_string(),
            value: value.to_string(),
            line,
        });
    }

    fn on_unknown_line(&self, tag: &str, line: usize) {
        self.record(ObservedEvent::UnknownLine {
            tag: tag.to_string(),
            line,
        });
    }

    fn on_parse_complete(&self, lines: usize, media: usize) {
        self.record(ObservedEvent::ParseComplete { lines, media });
    }
}
