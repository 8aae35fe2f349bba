// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::LineType;
use crate::order::LineSet;
use smol_str::SmolStr;
use std::fmt;

/// Fatal decoding errors.
///
/// Recoverable conditions (relaxed-mode skips and substitutions,
/// non-standard values) never show up here; they go to the observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Line without a `=` separator
    MalformedLine { line: usize, text: SmolStr },
    /// Line type not allowed at this position
    IllegalLineOrder {
        expected: LineSet,
        received: LineType,
        line: usize,
    },
    /// Value rejected by its decoder
    FieldDecode {
        field: SmolStr,
        value: SmolStr,
        line: usize,
        reason: String,
    },
    /// Mandatory line never seen (strict mode)
    MissingField(LineType),
    /// Collection limit exceeded (DoS protection)
    LimitExceeded {
        collection: &'static str,
        limit: usize,
        line: usize,
    },
    /// Line longer than the configured maximum
    LineTooLong {
        line: usize,
        length: usize,
        limit: usize,
    },
    /// Field targets the last entry of an empty sequence
    DetachedField {
        field: &'static str,
        parent: &'static str,
        line: usize,
    },
}

impl ParseError {
    /// 1-based line number the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MalformedLine { line, .. }
            | ParseError::IllegalLineOrder { line, .. }
            | ParseError::FieldDecode { line, .. }
            | ParseError::LimitExceeded { line, .. }
            | ParseError::LineTooLong { line, .. }
            | ParseError::DetachedField { line, .. } => Some(*line),
            ParseError::MissingField(_) => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedLine { line, text } => {
                write!(f, "line {}: missing '=' separator in {:?}", line, text)
            }
            ParseError::IllegalLineOrder {
                expected,
                received,
                line,
            } => write!(
                f,
                "line {}: illegal line order, expected one of {} but received {}=",
                line, expected, received
            ),
            ParseError::FieldDecode {
                field,
                value,
                line,
                reason,
            } => write!(
                f,
                "line {}: cannot decode {} from {:?}: {}",
                line, field, value, reason
            ),
            ParseError::MissingField(line_type) => {
                write!(f, "Missing required SDP field: {}=", line_type)
            }
            ParseError::LimitExceeded {
                collection,
                limit,
                line,
            } => write!(
                f,
                "line {}: too many items in {} (limit {})",
                line, collection, limit
            ),
            ParseError::LineTooLong {
                line,
                length,
                limit,
            } => write!(f, "line {}: length {} exceeds max {}", line, length, limit),
            ParseError::DetachedField {
                field,
                parent,
                line,
            } => write!(
                f,
                "line {}: {} has no {} entry to attach to",
                line, field, parent
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Failure reported by a decode function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    reason: String,
}

impl DecodeFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for DecodeFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_order_violation() {
        let err = ParseError::IllegalLineOrder {
            expected: LineSet::of(&[LineType::Origin]),
            received: LineType::SessionName,
            line: 2,
        };
        assert_eq!(
            err.to_string(),
            "line 2: illegal line order, expected one of {o} but received s="
        );
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn missing_field_has_no_line() {
        let err = ParseError::MissingField(LineType::SessionName);
        assert_eq!(err.line(), None);
        assert_eq!(err.to_string(), "Missing required SDP field: s=");
    }
}
