// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::LineType;
use crate::order::LineSet;
use crate::value::Value;
use sdp_observe::ParseObserver;
use smol_str::SmolStr;
use std::fmt;

/// A recoverable condition noticed while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Relaxed mode dropped a line that was out of order.
    LineSkipped {
        line: usize,
        received: LineType,
        expected: LineSet,
    },
    /// Relaxed mode replaced an undecodable field with its default.
    FieldRecovered {
        field: SmolStr,
        discarded: SmolStr,
        substituted: Value,
        line: usize,
    },
    /// Value decoded but is outside the recommended set.
    NonStandardValue {
        field: SmolStr,
        value: SmolStr,
        line: usize,
    },
    /// Line tag is not an SDP line type.
    UnknownLineType { tag: SmolStr, line: usize },
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::LineSkipped { line, .. }
            | Diagnostic::FieldRecovered { line, .. }
            | Diagnostic::NonStandardValue { line, .. }
            | Diagnostic::UnknownLineType { line, .. } => *line,
        }
    }

    /// Hands the diagnostic to `observer`.
    pub fn report(&self, observer: &dyn ParseObserver) {
        match self {
            Diagnostic::LineSkipped {
                line,
                received,
                expected,
            } => observer.on_line_skipped(*line, &received.to_string(), &expected.to_string()),
            Diagnostic::FieldRecovered {
                field,
                discarded,
                substituted,
                line,
            } => observer.on_field_recovered(field, discarded, &substituted.to_string(), *line),
            Diagnostic::NonStandardValue { field, value, line } => {
                observer.on_non_standard_value(field, value, *line)
            }
            Diagnostic::UnknownLineType { tag, line } => observer.on_unknown_line(tag, *line),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LineSkipped {
                line,
                received,
                expected,
            } => write!(
                f,
                "line {}: skipped {}=, expected one of {}",
                line, received, expected
            ),
            Diagnostic::FieldRecovered {
                field,
                discarded,
                substituted,
                line,
            } => write!(
                f,
                "line {}: {} {:?} replaced by {}",
                line, field, discarded, substituted
            ),
            Diagnostic::NonStandardValue { field, value, line } => {
                write!(f, "line {}: non-standard {} {:?}", line, field, value)
            }
            Diagnostic::UnknownLineType { tag, line } => {
                write!(f, "line {}: unknown line type {:?}", line, tag)
            }
        }
    }
}
