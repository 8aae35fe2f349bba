// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-order state machine (RFC 4566 §5 grammar).
//!
//! The state is the set of line types allowed to follow the current line.
//! It starts at `{v}` and is replaced by the successor set of every accepted
//! line, looked up per section.

use crate::line::{LineType, Section, TypedLine};
use std::fmt;

/// Bit set of [`LineType`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineSet(u16);

impl LineSet {
    pub const EMPTY: LineSet = LineSet(0);

    pub const fn of(types: &[LineType]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < types.len() {
            bits |= types[i].bit();
            i += 1;
        }
        LineSet(bits)
    }

    pub const fn contains(self, line_type: LineType) -> bool {
        self.0 & line_type.bit() != 0
    }

    pub const fn with(self, line_type: LineType) -> Self {
        LineSet(self.0 | line_type.bit())
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in grammar order.
    pub fn iter(self) -> impl Iterator<Item = LineType> {
        LineType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl fmt::Display for LineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, line_type) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", line_type)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for LineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineSet{}", self)
    }
}

const V: LineType = LineType::Version;
const O: LineType = LineType::Origin;
const S: LineType = LineType::SessionName;
const I: LineType = LineType::Information;
const U: LineType = LineType::Uri;
const E: LineType = LineType::Email;
const P: LineType = LineType::Phone;
const C: LineType = LineType::Connection;
const B: LineType = LineType::Bandwidth;
const T: LineType = LineType::Timing;
const R: LineType = LineType::Repeat;
const Z: LineType = LineType::TimeZone;
const K: LineType = LineType::EncryptionKey;
const A: LineType = LineType::Attribute;
const M: LineType = LineType::Media;

const fn session_successors(line_type: LineType) -> Option<LineSet> {
    Some(match line_type {
        LineType::Version => LineSet::of(&[O]),
        LineType::Origin => LineSet::of(&[S]),
        LineType::SessionName => LineSet::of(&[I, U, E, P, C, B, T, Z, K, A, M]),
        LineType::Information => LineSet::of(&[U, E, P, C, B, T, Z, K, A, M]),
        LineType::Uri => LineSet::of(&[E, P, C, B, T, Z, K, A, M]),
        LineType::Email => LineSet::of(&[E, P, C, B, T, Z, K, A, M]),
        LineType::Phone => LineSet::of(&[P, C, B, T, Z, K, A, M]),
        LineType::Connection => LineSet::of(&[B, T, Z, K, A, M]),
        LineType::Bandwidth => LineSet::of(&[T, Z, K, A, M]),
        LineType::Timing => LineSet::of(&[T, R, Z, K, A, M]),
        LineType::Repeat => LineSet::of(&[T, Z, K, A, M]),
        LineType::TimeZone => LineSet::of(&[K, A, M]),
        LineType::EncryptionKey => LineSet::of(&[A, M]),
        LineType::Attribute => LineSet::of(&[A, M]),
        LineType::Media => return None,
    })
}

const fn media_successors(line_type: LineType) -> Option<LineSet> {
    Some(match line_type {
        LineType::Media => LineSet::of(&[M, I, C, B, K, A]),
        LineType::Information => LineSet::of(&[M, C, B, K, A]),
        LineType::Connection => LineSet::of(&[M, B, K, A]),
        LineType::Bandwidth => LineSet::of(&[M, K, A]),
        LineType::EncryptionKey => LineSet::of(&[M, A]),
        LineType::Attribute => LineSet::of(&[M, A]),
        _ => return None,
    })
}

/// Transition table entry for `(section, line_type)`.
pub const fn successors(section: Section, line_type: LineType) -> Option<LineSet> {
    match section {
        Section::Session => session_successors(line_type),
        Section::Media => media_successors(line_type),
    }
}

/// A line whose type is not in the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderViolation {
    pub expected: LineSet,
    pub received: LineType,
}

/// Allowed-set state of the order validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOrder {
    allowed: LineSet,
}

impl Default for LineOrder {
    fn default() -> Self {
        Self {
            allowed: LineSet::of(&[V]),
        }
    }
}

impl LineOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowed(&self) -> LineSet {
        self.allowed
    }

    /// Returns the state after accepting `line`.
    ///
    /// A line without a transition entry keeps the current allowed set.
    pub fn advance(self, line: &TypedLine) -> Result<LineOrder, OrderViolation> {
        if !self.allowed.contains(line.line_type) {
            return Err(OrderViolation {
                expected: self.allowed,
                received: line.line_type,
            });
        }
        Ok(LineOrder {
            allowed: successors(line.section, line.line_type).unwrap_or(self.allowed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    fn line(line_type: LineType, section: Section) -> TypedLine {
        TypedLine {
            line_type,
            value: SmolStr::default(),
            number: 1,
            section,
        }
    }

    fn run(types: &[LineType]) -> Result<LineOrder, OrderViolation> {
        let mut section = Section::Session;
        let mut order = LineOrder::new();
        for &line_type in types {
            section = section.classify(line_type);
            order = order.advance(&line(line_type, section))?;
        }
        Ok(order)
    }

    #[test]
    fn starts_with_version_only() {
        assert_eq!(LineOrder::new().allowed(), LineSet::of(&[V]));
        assert_eq!(LineOrder::new().allowed().to_string(), "{v}");
    }

    #[test]
    fn accepts_full_session_sequence() {
        let order = run(&[V, O, S, I, U, E, E, P, C, B, T, R, T, Z, K, A, A, M, I, C, B, K, A, M])
            .unwrap();
        assert_eq!(order.allowed(), LineSet::of(&[M, I, C, B, K, A]));
    }

    #[test]
    fn rejects_session_name_before_origin() {
        let err = run(&[V, S]).unwrap_err();
        assert_eq!(err.expected, LineSet::of(&[O]));
        assert_eq!(err.received, S);
    }

    #[test]
    fn rejects_repeat_without_timing() {
        let err = run(&[V, O, S, R]).unwrap_err();
        assert_eq!(err.received, R);
        assert!(err.expected.contains(T));
        assert!(!err.expected.contains(R));
    }

    #[test]
    fn rejects_session_only_lines_in_media() {
        for late in [T, Z, U, E, P, R] {
            let err = run(&[V, O, S, M, late]).unwrap_err();
            assert_eq!(err.expected, LineSet::of(&[M, I, C, B, K, A]));
        }
    }

    #[test]
    fn rejects_repeated_mandatory_lines() {
        assert!(run(&[V, V]).is_err());
        assert!(run(&[V, O, O]).is_err());
        assert!(run(&[V, O, S, S]).is_err());
    }

    #[test]
    fn media_information_must_precede_connection() {
        assert!(run(&[V, O, S, M, C, I]).is_err());
        assert!(run(&[V, O, S, M, I, C]).is_ok());
    }

    #[test]
    fn missing_entry_keeps_allowed_set() {
        // o= is accepted while the media section holds {o}; media has no
        // entry for o=, so the set stays put.
        let order = LineOrder::new()
            .advance(&line(V, Section::Session))
            .unwrap()
            .advance(&line(O, Section::Media))
            .unwrap();
        assert_eq!(order.allowed(), LineSet::of(&[O]));
    }

    #[test]
    fn line_set_display_follows_grammar_order() {
        assert_eq!(LineSet::of(&[A, M, I]).to_string(), "{i, a, m}");
        assert_eq!(LineSet::EMPTY.to_string(), "{}");
        assert_eq!(LineSet::of(&[A, M]).len(), 2);
    }
}
