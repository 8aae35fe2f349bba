// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field rules: how each line type is decoded and where it is stored.
//!
//! Rules are static data. [`rule_for`] matches exhaustively on
//! [`LineType`], so adding a line type without a rule does not compile.

use crate::line::{LineType, Section};
use crate::registry::FieldType;
use crate::value::Value;

/// Top-level sequence holding one record per `m=` line.
pub const MEDIA_DESCRIPTIONS: &str = "media_descriptions";
/// Top-level sequence holding one record per `t=` line.
pub const TIMING: &str = "timing";
/// Sequence of `a=` records, at session level and in each media entry.
pub const ATTRIBUTES: &str = "attributes";

const NET_TYPES: &[&str] = &["IN"];
const ADDR_TYPES: &[&str] = &["IP4", "IP6"];
const BANDWIDTH_TYPES: &[&str] = &["CT", "AS"];
const MEDIA_TYPES: &[&str] = &["audio", "video", "text", "application", "message"];
const PROTOCOLS: &[&str] = &[
    "RTP/AVP",
    "RTP/SAVP",
    "RTP/SAVPF",
    "UDP/TLS/RTP/SAVPF",
    "TCP/TLS/RTP/SAVPF",
    "UDP",
    "TCP",
];

/// How a compound value is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Runs of whitespace; empty tokens never appear.
    Whitespace,
    Char(char),
}

impl Separator {
    /// Splits `raw`; with `limit`, the last token holds the unsplit remainder.
    pub fn split(self, raw: &str, limit: Option<usize>) -> Vec<&str> {
        match (self, limit) {
            (Separator::Char(c), Some(n)) => raw.splitn(n, c).collect(),
            (Separator::Char(c), None) => raw.split(c).collect(),
            (Separator::Whitespace, None) => raw.split_whitespace().collect(),
            (Separator::Whitespace, Some(n)) => split_whitespace_n(raw, n),
        }
    }
}

fn split_whitespace_n(raw: &str, n: usize) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = raw.trim();
    while !rest.is_empty() {
        if tokens.len() + 1 >= n {
            tokens.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(idx) => {
                tokens.push(&rest[..idx]);
                rest = rest[idx..].trim_start();
            }
            None => {
                tokens.push(rest);
                break;
            }
        }
    }
    tokens
}

/// One named component of a compound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubField {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Recommended values; others decode but are reported.
    pub expected: &'static [&'static str],
    pub optional: bool,
}

impl SubField {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            expected: &[],
            optional: false,
        }
    }

    pub const fn expecting(mut self, expected: &'static [&'static str]) -> Self {
        self.expected = expected;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Layout of a compound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundSpec {
    pub separator: Separator,
    pub limit: Option<usize>,
    pub fields: &'static [SubField],
    /// Collects every token after `fields` into a sequence (at least one).
    pub trailing: Option<SubField>,
    /// Cycle `fields` over all tokens, producing a sequence of groups.
    pub repeats: bool,
}

impl CompoundSpec {
    const fn new(separator: Separator, fields: &'static [SubField]) -> Self {
        Self {
            separator,
            limit: None,
            fields,
            trailing: None,
            repeats: false,
        }
    }

    const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    const fn trailing(mut self, trailing: SubField) -> Self {
        self.trailing = Some(trailing);
        self
    }

    const fn repeating(mut self) -> Self {
        self.repeats = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSpec {
    Atomic {
        field_type: FieldType,
        expected: &'static [&'static str],
    },
    Compound(CompoundSpec),
}

/// Fixed value substituted for a field that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Integer(i128),
    Text(&'static str),
}

impl Fallback {
    pub fn to_value(self) -> Value {
        match self {
            Fallback::Integer(n) => Value::Integer(n),
            Fallback::Text(s) => Value::text(s),
        }
    }
}

/// Relaxed-mode recovery for a field that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFail {
    Substitute(Fallback),
}

/// Where a decoded value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Set the top-level key; last value wins.
    Replace,
    /// Push onto a top-level sequence.
    Append,
    /// Set the key on the last entry of `parent`.
    AttachToLast { parent: &'static str },
    /// Push onto a sequence held by the last entry of `parent`.
    AppendIntoLast { parent: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub target: &'static str,
    pub decode: DecodeSpec,
    pub on_fail: Option<OnFail>,
    pub insertion: Insertion,
    /// Overrides `insertion` inside the media section.
    pub media_insertion: Option<Insertion>,
}

impl FieldRule {
    pub fn insertion_for(&self, section: Section) -> Insertion {
        match section {
            Section::Session => self.insertion,
            Section::Media => self.media_insertion.unwrap_or(self.insertion),
        }
    }
}

const fn atomic(field_type: FieldType) -> DecodeSpec {
    DecodeSpec::Atomic {
        field_type,
        expected: &[],
    }
}

const fn rule(target: &'static str, decode: DecodeSpec, insertion: Insertion) -> FieldRule {
    FieldRule {
        target,
        decode,
        on_fail: None,
        insertion,
        media_insertion: None,
    }
}

const IN_MEDIA_ENTRY: Insertion = Insertion::AttachToLast {
    parent: MEDIA_DESCRIPTIONS,
};
const INTO_MEDIA_ENTRY: Insertion = Insertion::AppendIntoLast {
    parent: MEDIA_DESCRIPTIONS,
};

const ORIGIN_FIELDS: &[SubField] = &[
    SubField::new("username", FieldType::String),
    SubField::new("session_id", FieldType::NumericString),
    SubField::new("session_version", FieldType::NumericString),
    SubField::new("network_type", FieldType::String).expecting(NET_TYPES),
    SubField::new("address_type", FieldType::String).expecting(ADDR_TYPES),
    SubField::new("address", FieldType::String),
];

const CONNECTION_FIELDS: &[SubField] = &[
    SubField::new("network_type", FieldType::String).expecting(NET_TYPES),
    SubField::new("address_type", FieldType::String).expecting(ADDR_TYPES),
    SubField::new("address", FieldType::IpAddress),
];

const BANDWIDTH_FIELDS: &[SubField] = &[
    SubField::new("bandwidth_type", FieldType::String).expecting(BANDWIDTH_TYPES),
    SubField::new("bandwidth", FieldType::Integer),
];

const TIMING_FIELDS: &[SubField] = &[
    SubField::new("start", FieldType::Instant),
    SubField::new("stop", FieldType::Instant),
];

const REPEAT_FIELDS: &[SubField] = &[
    SubField::new("interval", FieldType::Duration),
    SubField::new("active_duration", FieldType::Duration),
];

const TIME_ZONE_FIELDS: &[SubField] = &[
    SubField::new("adjustment", FieldType::Instant),
    SubField::new("offset", FieldType::Duration),
];

const ATTRIBUTE_FIELDS: &[SubField] = &[
    SubField::new("attribute", FieldType::String),
    SubField::new("value", FieldType::String).optional(),
];

const MEDIA_FIELDS: &[SubField] = &[
    SubField::new("media_type", FieldType::String).expecting(MEDIA_TYPES),
    SubField::new("port", FieldType::Port),
    SubField::new("protocol", FieldType::String).expecting(PROTOCOLS),
];

static VERSION: FieldRule = FieldRule {
    on_fail: Some(OnFail::Substitute(Fallback::Integer(0))),
    ..rule("version", atomic(FieldType::Integer), Insertion::Replace)
};

static ORIGIN: FieldRule = rule(
    "origin",
    DecodeSpec::Compound(CompoundSpec::new(Separator::Whitespace, ORIGIN_FIELDS)),
    Insertion::Replace,
);

static SESSION_NAME: FieldRule = rule("name", atomic(FieldType::String), Insertion::Replace);

static INFORMATION: FieldRule = FieldRule {
    media_insertion: Some(IN_MEDIA_ENTRY),
    ..rule("information", atomic(FieldType::String), Insertion::Replace)
};

static URI: FieldRule = rule("uri", atomic(FieldType::String), Insertion::Replace);

static EMAIL: FieldRule = rule("email", atomic(FieldType::String), Insertion::Append);

static PHONE: FieldRule = rule("phone", atomic(FieldType::String), Insertion::Append);

static CONNECTION: FieldRule = FieldRule {
    media_insertion: Some(INTO_MEDIA_ENTRY),
    ..rule(
        "connection",
        DecodeSpec::Compound(CompoundSpec::new(Separator::Whitespace, CONNECTION_FIELDS)),
        Insertion::Replace,
    )
};

static BANDWIDTH: FieldRule = FieldRule {
    media_insertion: Some(INTO_MEDIA_ENTRY),
    ..rule(
        "bandwidth",
        DecodeSpec::Compound(CompoundSpec::new(Separator::Char(':'), BANDWIDTH_FIELDS).limit(2)),
        Insertion::Append,
    )
};

static TIMING_RULE: FieldRule = rule(
    TIMING,
    DecodeSpec::Compound(CompoundSpec::new(Separator::Whitespace, TIMING_FIELDS)),
    Insertion::Append,
);

static REPEAT: FieldRule = rule(
    "repeat",
    DecodeSpec::Compound(
        CompoundSpec::new(Separator::Whitespace, REPEAT_FIELDS)
            .trailing(SubField::new("offsets", FieldType::Duration)),
    ),
    Insertion::AppendIntoLast { parent: TIMING },
);

static TIME_ZONE: FieldRule = rule(
    "timezone",
    DecodeSpec::Compound(CompoundSpec::new(Separator::Whitespace, TIME_ZONE_FIELDS).repeating()),
    Insertion::Replace,
);

static ENCRYPTION_KEY: FieldRule = FieldRule {
    media_insertion: Some(IN_MEDIA_ENTRY),
    ..rule("encryption_key", atomic(FieldType::String), Insertion::Replace)
};

static ATTRIBUTE: FieldRule = FieldRule {
    media_insertion: Some(INTO_MEDIA_ENTRY),
    ..rule(
        ATTRIBUTES,
        DecodeSpec::Compound(CompoundSpec::new(Separator::Char(':'), ATTRIBUTE_FIELDS).limit(2)),
        Insertion::Append,
    )
};

static MEDIA: FieldRule = rule(
    MEDIA_DESCRIPTIONS,
    DecodeSpec::Compound(
        CompoundSpec::new(Separator::Whitespace, MEDIA_FIELDS)
            .trailing(SubField::new("format", FieldType::String)),
    ),
    Insertion::Append,
);

/// The rule for `line_type`.
pub fn rule_for(line_type: LineType) -> &'static FieldRule {
    match line_type {
        LineType::Version => &VERSION,
        LineType::Origin => &ORIGIN,
        LineType::SessionName => &SESSION_NAME,
        LineType::Information => &INFORMATION,
        LineType::Uri => &URI,
        LineType::Email => &EMAIL,
        LineType::Phone => &PHONE,
        LineType::Connection => &CONNECTION,
        LineType::Bandwidth => &BANDWIDTH,
        LineType::Timing => &TIMING_RULE,
        LineType::Repeat => &REPEAT,
        LineType::TimeZone => &TIME_ZONE,
        LineType::EncryptionKey => &ENCRYPTION_KEY,
        LineType::Attribute => &ATTRIBUTE,
        LineType::Media => &MEDIA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_split_collapses_runs() {
        assert_eq!(
            Separator::Whitespace.split("IN  IP4\t192.0.2.1 ", None),
            vec!["IN", "IP4", "192.0.2.1"]
        );
        assert!(Separator::Whitespace.split("", None).is_empty());
    }

    #[test]
    fn char_split_honours_limit() {
        assert_eq!(
            Separator::Char(':').split("fmtp:101 a=b:c", Some(2)),
            vec!["fmtp", "101 a=b:c"]
        );
        assert_eq!(Separator::Char(':').split("sendrecv", Some(2)), vec!["sendrecv"]);
        assert_eq!(Separator::Char(':').split("a:b:c", None), vec!["a", "b", "c"]);
    }

    #[test]
    fn whitespace_split_honours_limit() {
        assert_eq!(
            Separator::Whitespace.split("one two  three four", Some(2)),
            vec!["one", "two  three four"]
        );
        assert_eq!(Separator::Whitespace.split("one", Some(3)), vec!["one"]);
    }

    #[test]
    fn media_level_rules_target_last_media_entry() {
        for line_type in [
            LineType::Information,
            LineType::Connection,
            LineType::Bandwidth,
            LineType::EncryptionKey,
            LineType::Attribute,
        ] {
            match rule_for(line_type).insertion_for(Section::Media) {
                Insertion::AttachToLast { parent } | Insertion::AppendIntoLast { parent } => {
                    assert_eq!(parent, MEDIA_DESCRIPTIONS)
                }
                other => panic!("{} uses {:?} in media", line_type, other),
            }
        }
    }

    #[test]
    fn session_level_rules_write_top_level() {
        assert_eq!(
            rule_for(LineType::Connection).insertion_for(Section::Session),
            Insertion::Replace
        );
        assert_eq!(
            rule_for(LineType::Attribute).insertion_for(Section::Session),
            Insertion::Append
        );
        assert_eq!(
            rule_for(LineType::Repeat).insertion_for(Section::Session),
            Insertion::AppendIntoLast { parent: TIMING }
        );
    }

    #[test]
    fn only_version_has_a_fallback() {
        for line_type in LineType::ALL {
            let rule = rule_for(line_type);
            if line_type == LineType::Version {
                assert_eq!(
                    rule.on_fail,
                    Some(OnFail::Substitute(Fallback::Integer(0)))
                );
            } else {
                assert_eq!(rule.on_fail, None, "{}", line_type);
            }
        }
    }
}
