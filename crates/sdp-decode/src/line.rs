// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line tokenizer and section classifier.
//!
//! Every SDP line has the form `<type>=<value>` where type is a single
//! character (RFC 4566 §5).

use crate::error::ParseError;
use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::rest,
    sequence::separated_pair,
    IResult,
};
use smol_str::SmolStr;
use std::fmt;

/// SDP line types in grammar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LineType {
    /// v= protocol version
    Version,
    /// o= originator and session identifier
    Origin,
    /// s= session name
    SessionName,
    /// i= session or media information
    Information,
    /// u= URI of description
    Uri,
    /// e= email address
    Email,
    /// p= phone number
    Phone,
    /// c= connection information
    Connection,
    /// b= bandwidth
    Bandwidth,
    /// t= time the session is active
    Timing,
    /// r= repeat times
    Repeat,
    /// z= time zone adjustments
    TimeZone,
    /// k= encryption key
    EncryptionKey,
    /// a= attribute
    Attribute,
    /// m= media name and transport address
    Media,
}

impl LineType {
    pub const ALL: [LineType; 15] = [
        LineType::Version,
        LineType::Origin,
        LineType::SessionName,
        LineType::Information,
        LineType::Uri,
        LineType::Email,
        LineType::Phone,
        LineType::Connection,
        LineType::Bandwidth,
        LineType::Timing,
        LineType::Repeat,
        LineType::TimeZone,
        LineType::EncryptionKey,
        LineType::Attribute,
        LineType::Media,
    ];

    pub const fn tag(self) -> char {
        match self {
            LineType::Version => 'v',
            LineType::Origin => 'o',
            LineType::SessionName => 's',
            LineType::Information => 'i',
            LineType::Uri => 'u',
            LineType::Email => 'e',
            LineType::Phone => 'p',
            LineType::Connection => 'c',
            LineType::Bandwidth => 'b',
            LineType::Timing => 't',
            LineType::Repeat => 'r',
            LineType::TimeZone => 'z',
            LineType::EncryptionKey => 'k',
            LineType::Attribute => 'a',
            LineType::Media => 'm',
        }
    }

    /// Maps a line tag to its type. Tags are exactly one character.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let mut chars = tag.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        LineType::ALL.into_iter().find(|t| t.tag() == c)
    }

    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Which part of the description a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Session,
    Media,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Session => "session",
            Section::Media => "media",
        }
    }

    /// Section for a line of `line_type` read while in `self`.
    ///
    /// Once in `Media` there is no way back.
    pub fn classify(self, line_type: LineType) -> Section {
        if self == Section::Media || line_type == LineType::Media {
            Section::Media
        } else {
            Section::Session
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-blank input line with its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Splits `input` into non-blank lines.
///
/// Blank lines are dropped but still counted, so numbers match the input.
pub fn raw_lines(input: &str) -> impl Iterator<Item = RawLine<'_>> {
    input
        .lines()
        .enumerate()
        .map(|(idx, text)| RawLine {
            number: idx + 1,
            text,
        })
        .filter(|line| !line.text.trim().is_empty())
}

/// Result of splitting a line at its first `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Known { line_type: LineType, value: &'a str },
    Unknown { tag: &'a str, value: &'a str },
}

fn split_at_equals(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_till(|c| c == '='), char('='), rest)(input)
}

/// Splits a raw line into its type tag and trimmed value.
pub fn tokenize<'a>(raw: &RawLine<'a>) -> Result<Token<'a>, ParseError> {
    let (_, (tag, value)) = split_at_equals(raw.text).map_err(|_| ParseError::MalformedLine {
        line: raw.number,
        text: SmolStr::new(raw.text),
    })?;
    let tag = tag.trim();
    let value = value.trim();

    Ok(match LineType::from_tag(tag) {
        Some(line_type) => Token::Known { line_type, value },
        None => Token::Unknown { tag, value },
    })
}

/// A tokenized line tagged with its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedLine {
    pub line_type: LineType,
    pub value: SmolStr,
    pub number: usize,
    pub section: Section,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawLine<'_> {
        RawLine { number: 7, text }
    }

    #[test]
    fn tokenizes_known_line() {
        assert_eq!(
            tokenize(&raw("s=Test Session")).unwrap(),
            Token::Known {
                line_type: LineType::SessionName,
                value: "Test Session"
            }
        );
    }

    #[test]
    fn splits_on_first_equals_only() {
        assert_eq!(
            tokenize(&raw("a=fmtp:101 0-15;x=y")).unwrap(),
            Token::Known {
                line_type: LineType::Attribute,
                value: "fmtp:101 0-15;x=y"
            }
        );
    }

    #[test]
    fn trims_tag_and_value() {
        assert_eq!(
            tokenize(&raw(" v = 0 \r")).unwrap(),
            Token::Known {
                line_type: LineType::Version,
                value: "0"
            }
        );
    }

    #[test]
    fn unknown_tags_are_not_errors() {
        assert_eq!(
            tokenize(&raw("x=custom")).unwrap(),
            Token::Unknown {
                tag: "x",
                value: "custom"
            }
        );
        assert_eq!(
            tokenize(&raw("vv=0")).unwrap(),
            Token::Unknown {
                tag: "vv",
                value: "0"
            }
        );
    }

    #[test]
    fn rejects_line_without_separator() {
        match tokenize(&raw("garbage")) {
            Err(ParseError::MalformedLine { line: 7, text }) => assert_eq!(text, "garbage"),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn raw_lines_skip_blanks_but_keep_numbering() {
        let lines: Vec<_> = raw_lines("v=0\r\n\r\no=x\n   \ns=y").collect();
        assert_eq!(
            lines.iter().map(|l| l.number).collect::<Vec<_>>(),
            vec![1, 3, 5]
        );
        assert_eq!(lines[0].text, "v=0");
    }

    #[test]
    fn section_flips_once_on_media() {
        let section = Section::Session;
        assert_eq!(section.classify(LineType::Attribute), Section::Session);
        let section = section.classify(LineType::Media);
        assert_eq!(section, Section::Media);
        assert_eq!(section.classify(LineType::Attribute), Section::Media);
        assert_eq!(section.classify(LineType::Version), Section::Media);
    }

    #[test]
    fn tags_round_trip_through_from_tag() {
        for line_type in LineType::ALL {
            let tag = line_type.tag().to_string();
            assert_eq!(LineType::from_tag(&tag), Some(line_type));
        }
        assert_eq!(LineType::from_tag(""), None);
    }
}
