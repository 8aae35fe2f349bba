// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parser configuration.

use crate::error::DecodeFailure;
use crate::registry::{DecodeFn, DecoderRegistry, FieldType};
use crate::value::Value;
use sdp_observe::ParseObserver;
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the parser treats out-of-order lines and undecodable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseMode {
    /// First violation aborts the parse.
    #[default]
    Strict,
    /// Out-of-order lines are dropped; fields with a default are recovered.
    Relaxed,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Strict => "strict",
            ParseMode::Relaxed => "relaxed",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a [`ParseMode`] from an unknown name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParseMode(pub SmolStr);

impl fmt::Display for UnknownParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parse mode: {}", self.0)
    }
}

impl std::error::Error for UnknownParseMode {}

impl FromStr for ParseMode {
    type Err = UnknownParseMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("strict") {
            Ok(ParseMode::Strict)
        } else if s.eq_ignore_ascii_case("relaxed") {
            Ok(ParseMode::Relaxed)
        } else {
            Err(UnknownParseMode(SmolStr::new(s)))
        }
    }
}

/// Input size limits, enforced in both modes.
///
/// The default is unbounded, so any well-formed description decodes.
/// Callers parsing untrusted input opt in with [`ParseLimits::hardened`];
/// exceeding a limit is then fatal even in relaxed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_line_length: usize,
    pub max_media_descriptions: usize,
    /// Per level: session attributes and each media entry's attributes.
    pub max_attributes: usize,
}

impl ParseLimits {
    pub const fn unbounded() -> Self {
        Self {
            max_line_length: usize::MAX,
            max_media_descriptions: usize::MAX,
            max_attributes: usize::MAX,
        }
    }

    /// DoS limits for descriptions received from the network.
    pub const fn hardened() -> Self {
        Self {
            max_line_length: 4096,
            max_media_descriptions: 50,
            max_attributes: 100,
        }
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Everything a parse needs besides the input text.
///
/// Cheap to clone and safe to share between threads.
#[derive(Clone, Default)]
pub struct ParserConfig {
    mode: ParseMode,
    registry: DecoderRegistry,
    limits: ParseLimits,
    observer: Option<Arc<dyn ParseObserver>>,
}

impl ParserConfig {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn relaxed() -> Self {
        Self::default().with_mode(ParseMode::Relaxed)
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_registry(mut self, registry: DecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Overrides one decode function for every parse made with this config.
    pub fn with_decoder<F>(mut self, field_type: FieldType, decoder: F) -> Self
    where
        F: Fn(&str) -> Result<Value, DecodeFailure> + Send + Sync + 'static,
    {
        self.registry = self.registry.with_decoder(field_type, decoder);
        self
    }

    pub fn with_decoders<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (FieldType, DecodeFn)>,
    {
        self.registry = self.registry.merge(overrides);
        self
    }

    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sends diagnostics to `observer` instead of the process-wide one.
    pub fn with_observer(mut self, observer: Arc<dyn ParseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    pub fn limits(&self) -> &ParseLimits {
        &self.limits
    }

    /// The configured observer, or the process-wide one.
    pub fn observer(&self) -> &dyn ParseObserver {
        match &self.observer {
            Some(observer) => observer.as_ref(),
            None => sdp_observe::parse_observer(),
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("mode", &self.mode)
            .field("registry", &self.registry)
            .field("limits", &self.limits)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
