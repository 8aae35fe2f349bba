// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule-driven SDP line decoder (RFC 4566)
//!
//! This crate provides:
//! - A line tokenizer and session/media section classifier
//! - Line-order validation against the RFC 4566 §5 grammar
//! - Table-driven field decoding into a [`Value`] tree
//! - Strict and relaxed modes; relaxed mode skips out-of-order lines and
//!   substitutes defaults, reporting each recovery through `sdp-observe`
//! - Replaceable decode functions per field type
//!
//! # Example
//! ```
//! use sdp_decode::{parse_with, FieldType, ParserConfig, Value};
//!
//! let sdp_text = "v=0\r\n\
//!                 o=alice 123456 0 IN IP4 192.168.1.100\r\n\
//!                 s=VoIP Call\r\n\
//!                 t=0 0\r\n\
//!                 m=audio 8000 RTP/AVP 0 8\r\n\
//!                 a=rtpmap:0 PCMU/8000\r\n";
//!
//! // Keep ports as text instead of integers
//! let config = ParserConfig::relaxed()
//!     .with_decoder(FieldType::Port, |raw: &str| Ok(Value::text(raw)));
//!
//! let sdp = parse_with(sdp_text, &config).unwrap();
//! let audio = sdp.find_media("audio").unwrap();
//! assert_eq!(audio.get("port"), Some(&Value::text("8000")));
//! assert_eq!(audio.attribute("rtpmap"), Some("0 PCMU/8000"));
//! ```

pub mod builder;
pub mod config;
pub mod decode;
pub mod description;
pub mod diagnostic;
pub mod error;
pub mod line;
pub mod order;
pub mod parse;
pub mod registry;
pub mod rules;
pub mod value;

pub use config::{ParseLimits, ParseMode, ParserConfig, UnknownParseMode};
pub use description::{MediaDescription, SessionDescription};
pub use diagnostic::Diagnostic;
pub use error::{DecodeFailure, ParseError};
pub use line::{LineType, Section};
pub use order::LineSet;
pub use parse::{parse, parse_with};
pub use registry::{DecodeFn, DecoderRegistry, FieldType, UnknownFieldType};
pub use value::{ConnectionAddress, Record, Value};
