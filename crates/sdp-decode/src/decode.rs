// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field decoder: applies a [`FieldRule`] to one accepted line.

use crate::config::ParseMode;
use crate::diagnostic::Diagnostic;
use crate::error::ParseError;
use crate::line::TypedLine;
use crate::registry::DecoderRegistry;
use crate::rules::{CompoundSpec, DecodeSpec, FieldRule, OnFail, Separator, SubField};
use crate::value::{Record, Value};
use smol_str::SmolStr;

/// A decoded line value plus the diagnostics produced while decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub value: Value,
    pub notes: Vec<Diagnostic>,
}

/// Failure of one field or sub-field, before recovery is considered.
#[derive(Debug)]
struct FieldFailure {
    field: SmolStr,
    value: SmolStr,
    reason: String,
}

struct Decoder<'r> {
    rule: &'r FieldRule,
    registry: &'r DecoderRegistry,
    line: usize,
    notes: Vec<Diagnostic>,
}

/// Decodes `line` according to `rule`.
///
/// A failing field is fatal unless the rule carries a fallback and `mode`
/// is relaxed; the fallback is then used and a recovery note is attached.
pub fn decode_line(
    rule: &FieldRule,
    line: &TypedLine,
    registry: &DecoderRegistry,
    mode: ParseMode,
) -> Result<Decoded, ParseError> {
    let mut decoder = Decoder {
        rule,
        registry,
        line: line.number,
        notes: Vec::new(),
    };

    let outcome = match &rule.decode {
        DecodeSpec::Atomic {
            field_type,
            expected,
        } => {
            let sub = SubField::new(rule.target, *field_type).expecting(*expected);
            decoder.atomic(&sub, rule.target, &line.value)
        }
        DecodeSpec::Compound(spec) if spec.repeats => decoder.repeating(spec, &line.value),
        DecodeSpec::Compound(spec) => decoder.compound(spec, &line.value).map(Value::Record),
    };

    match (outcome, rule.on_fail, mode) {
        (Ok(value), _, _) => Ok(Decoded {
            value,
            notes: decoder.notes,
        }),
        (Err(_), Some(OnFail::Substitute(fallback)), ParseMode::Relaxed) => {
            // Notes about the discarded value are dropped with it.
            let substituted = fallback.to_value();
            Ok(Decoded {
                notes: vec![Diagnostic::FieldRecovered {
                    field: SmolStr::new(rule.target),
                    discarded: line.value.clone(),
                    substituted: substituted.clone(),
                    line: line.number,
                }],
                value: substituted,
            })
        }
        (Err(failure), _, _) => Err(ParseError::FieldDecode {
            field: failure.field,
            value: failure.value,
            line: line.number,
            reason: failure.reason,
        }),
    }
}

impl Decoder<'_> {
    fn atomic(&mut self, sub: &SubField, field: &str, raw: &str) -> Result<Value, FieldFailure> {
        let value = self
            .registry
            .decode(sub.field_type, raw)
            .map_err(|failure| FieldFailure {
                field: SmolStr::new(field),
                value: SmolStr::new(raw),
                reason: failure.reason().to_string(),
            })?;

        if !sub.expected.is_empty() && !value.is_one_of(sub.expected) {
            self.notes.push(Diagnostic::NonStandardValue {
                field: SmolStr::new(field),
                value: SmolStr::new(raw),
                line: self.line,
            });
        }
        Ok(value)
    }

    fn sub_name(&self, sub: &SubField) -> SmolStr {
        SmolStr::new(format!("{}.{}", self.rule.target, sub.name))
    }

    fn missing(&self, sub: &SubField) -> FieldFailure {
        FieldFailure {
            field: self.sub_name(sub),
            value: SmolStr::default(),
            reason: "missing value".to_string(),
        }
    }

    fn sub_field(&mut self, sub: &SubField, token: &str) -> Result<Value, FieldFailure> {
        let name = self.sub_name(sub);
        self.atomic(sub, &name, token)
    }

    fn compound(&mut self, spec: &CompoundSpec, raw: &str) -> Result<Record, FieldFailure> {
        let tokens = tokens(spec, raw);
        let mut record = Record::new();

        for (i, sub) in spec.fields.iter().enumerate() {
            match tokens.get(i) {
                Some(token) => {
                    let value = self.sub_field(sub, token)?;
                    record.set(sub.name, value);
                }
                None if sub.optional => {}
                None => return Err(self.missing(sub)),
            }
        }

        let rest = tokens.get(spec.fields.len()..).unwrap_or_default();
        match (&spec.trailing, spec.fields.last()) {
            (Some(trailing), _) => {
                if rest.is_empty() {
                    return Err(self.missing(trailing));
                }
                let items = rest
                    .iter()
                    .map(|token| self.sub_field(trailing, token))
                    .collect::<Result<Vec<_>, _>>()?;
                record.set(trailing.name, Value::List(items));
            }
            (None, Some(last)) if !rest.is_empty() => {
                return Err(FieldFailure {
                    field: self.sub_name(last),
                    value: SmolStr::new(rest.join(" ")),
                    reason: "unexpected trailing value".to_string(),
                });
            }
            (None, _) => {}
        }
        Ok(record)
    }

    fn repeating(&mut self, spec: &CompoundSpec, raw: &str) -> Result<Value, FieldFailure> {
        let tokens = tokens(spec, raw);
        let Some(first) = spec.fields.first() else {
            return Ok(Value::List(Vec::new()));
        };
        if tokens.is_empty() {
            return Err(self.missing(first));
        }

        let mut groups = Vec::new();
        for chunk in tokens.chunks(spec.fields.len()) {
            let mut group = Record::new();
            for (i, sub) in spec.fields.iter().enumerate() {
                let token = chunk.get(i).ok_or_else(|| self.missing(sub))?;
                let value = self.sub_field(sub, token)?;
                group.set(sub.name, value);
            }
            groups.push(Value::Record(group));
        }
        Ok(Value::List(groups))
    }
}

fn tokens<'a>(spec: &CompoundSpec, raw: &'a str) -> Vec<&'a str> {
    let tokens = spec.separator.split(raw, spec.limit);
    match spec.separator {
        Separator::Whitespace => tokens,
        Separator::Char(_) => tokens.into_iter().map(str::trim).collect(),
    }
}
