// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoding pipeline.
//!
//! Input is folded line by line: tokenize, classify the section, check the
//! line order, decode the field and insert it into the result. All state
//! lives in [`ParseState`], so concurrent parses never interact.

use crate::builder::StructureBuilder;
use crate::config::{ParseMode, ParserConfig};
use crate::decode::decode_line;
use crate::description::SessionDescription;
use crate::diagnostic::Diagnostic;
use crate::error::ParseError;
use crate::line::{raw_lines, tokenize, LineType, RawLine, Section, Token, TypedLine};
use crate::order::{LineOrder, LineSet};
use crate::rules::rule_for;
use sdp_observe::{span_with_mode, ParseObserver};
use smol_str::SmolStr;

const REQUIRED: [LineType; 3] = [LineType::Version, LineType::Origin, LineType::SessionName];

/// Parses `input` with the default configuration and the given mode.
pub fn parse(input: &str, mode: ParseMode) -> Result<SessionDescription, ParseError> {
    parse_with(input, &ParserConfig::default().with_mode(mode))
}

/// Parses `input` with `config`.
pub fn parse_with(input: &str, config: &ParserConfig) -> Result<SessionDescription, ParseError> {
    let _span = span_with_mode("parse", config.mode().as_str()).entered();
    let observer = config.observer();

    let result = raw_lines(input)
        .try_fold(ParseState::new(config), |state, raw| {
            state.consume(raw, config, observer)
        })
        .and_then(|state| state.finish(config.mode(), observer));

    if let Err(err) = &result {
        tracing::debug!(error = %err, "SDP decode failed");
    }
    result
}

/// Position of the fold within the input.
#[derive(Debug, Clone, Copy, Default)]
struct ParserContext {
    /// Non-blank lines consumed so far.
    lines: usize,
    section: Section,
    order: LineOrder,
}

/// Outcome of the order check for one line.
enum Step {
    Accepted { line: TypedLine, order: LineOrder },
    Skipped(Diagnostic),
}

impl ParserContext {
    fn admit(
        &self,
        line_type: LineType,
        value: &str,
        number: usize,
        mode: ParseMode,
    ) -> Result<Step, ParseError> {
        let line = TypedLine {
            line_type,
            value: SmolStr::new(value),
            number,
            section: self.section,
        };

        match (self.order.advance(&line), mode) {
            (Ok(order), _) => Ok(Step::Accepted { line, order }),
            (Err(violation), ParseMode::Strict) => Err(ParseError::IllegalLineOrder {
                expected: violation.expected,
                received: violation.received,
                line: number,
            }),
            (Err(violation), ParseMode::Relaxed) => Ok(Step::Skipped(Diagnostic::LineSkipped {
                line: number,
                received: violation.received,
                expected: violation.expected,
            })),
        }
    }
}

struct ParseState {
    context: ParserContext,
    builder: StructureBuilder,
    seen: LineSet,
}

impl ParseState {
    fn new(config: &ParserConfig) -> Self {
        Self {
            context: ParserContext::default(),
            builder: StructureBuilder::new(*config.limits()),
            seen: LineSet::EMPTY,
        }
    }

    fn consume(
        mut self,
        raw: RawLine<'_>,
        config: &ParserConfig,
        observer: &dyn ParseObserver,
    ) -> Result<Self, ParseError> {
        self.context.lines += 1;

        let limit = config.limits().max_line_length;
        if raw.text.len() > limit {
            return Err(ParseError::LineTooLong {
                line: raw.number,
                length: raw.text.len(),
                limit,
            });
        }

        let (line_type, value) = match tokenize(&raw)? {
            Token::Known { line_type, value } => (line_type, value),
            Token::Unknown { tag, .. } => {
                Diagnostic::UnknownLineType {
                    tag: SmolStr::new(tag),
                    line: raw.number,
                }
                .report(observer);
                return Ok(self);
            }
        };

        // Any media line flips the section, even one the order check skips.
        self.context.section = self.context.section.classify(line_type);

        let line = match self
            .context
            .admit(line_type, value, raw.number, config.mode())?
        {
            Step::Accepted { line, order } => {
                self.context.order = order;
                line
            }
            Step::Skipped(diagnostic) => {
                diagnostic.report(observer);
                return Ok(self);
            }
        };

        let rule = rule_for(line.line_type);
        let decoded = decode_line(rule, &line, config.registry(), config.mode())?;
        for note in &decoded.notes {
            note.report(observer);
        }
        self.builder
            .insert(rule, line.section, decoded.value, line.number)?;
        self.seen = self.seen.with(line.line_type);

        tracing::trace!(
            line = line.number,
            line_type = %line.line_type,
            section = %line.section,
            "line decoded"
        );
        Ok(self)
    }

    fn finish(
        self,
        mode: ParseMode,
        observer: &dyn ParseObserver,
    ) -> Result<SessionDescription, ParseError> {
        if mode == ParseMode::Strict {
            if let Some(missing) = REQUIRED.into_iter().find(|t| !self.seen.contains(*t)) {
                return Err(ParseError::MissingField(missing));
            }
        }

        observer.on_parse_complete(self.context.lines, self.builder.media_count());
        Ok(SessionDescription::from_record(self.builder.finish()))
    }
}
