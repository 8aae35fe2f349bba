// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structure builder: writes decoded values into the description record.

use crate::config::ParseLimits;
use crate::error::ParseError;
use crate::line::Section;
use crate::rules::{FieldRule, Insertion, ATTRIBUTES, MEDIA_DESCRIPTIONS};
use crate::value::{Record, Value};

/// Accumulates decoded values into a [`Record`].
#[derive(Debug, Clone, Default)]
pub struct StructureBuilder {
    root: Record,
    limits: ParseLimits,
}

impl StructureBuilder {
    pub fn new(limits: ParseLimits) -> Self {
        Self {
            root: Record::new(),
            limits,
        }
    }

    /// Stores `value` where `rule` says it goes for `section`.
    pub fn insert(
        &mut self,
        rule: &FieldRule,
        section: Section,
        value: Value,
        line: usize,
    ) -> Result<(), ParseError> {
        let limits = self.limits;
        match rule.insertion_for(section) {
            Insertion::Replace => {
                self.root.set(rule.target, value);
            }
            Insertion::Append => {
                check_limit(&self.root, rule.target, &limits, line)?;
                self.root.push_to(rule.target, value);
            }
            Insertion::AttachToLast { parent } => {
                self.last_entry(rule, parent, line)?.set(rule.target, value);
            }
            Insertion::AppendIntoLast { parent } => {
                let entry = self.last_entry(rule, parent, line)?;
                check_limit(entry, rule.target, &limits, line)?;
                entry.push_to(rule.target, value);
            }
        }
        Ok(())
    }

    fn last_entry(
        &mut self,
        rule: &FieldRule,
        parent: &'static str,
        line: usize,
    ) -> Result<&mut Record, ParseError> {
        self.root
            .last_record_mut(parent)
            .ok_or(ParseError::DetachedField {
                field: rule.target,
                parent,
                line,
            })
    }

    pub fn media_count(&self) -> usize {
        self.root.list_len(MEDIA_DESCRIPTIONS)
    }

    pub fn root(&self) -> &Record {
        &self.root
    }

    pub fn finish(self) -> Record {
        self.root
    }
}

fn check_limit(
    level: &Record,
    collection: &'static str,
    limits: &ParseLimits,
    line: usize,
) -> Result<(), ParseError> {
    let limit = match collection {
        MEDIA_DESCRIPTIONS => limits.max_media_descriptions,
        ATTRIBUTES => limits.max_attributes,
        _ => return Ok(()),
    };
    if level.list_len(collection) >= limit {
        return Err(ParseError::LimitExceeded {
            collection,
            limit,
            line,
        });
    }
    Ok(())
}
