// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only views over a decoded description.

use crate::config::ParseMode;
use crate::error::ParseError;
use crate::rules::{ATTRIBUTES, MEDIA_DESCRIPTIONS, TIMING};
use crate::value::{Record, Value};
use serde::Serialize;

/// A decoded SDP session description.
///
/// Wraps the record built by the decoder. Accessors return `None` (or an
/// empty iterator) when a field is absent or was decoded into a different
/// shape by a custom decode function; [`get`](Self::get) always exposes the
/// raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionDescription {
    root: Record,
}

impl SessionDescription {
    pub(crate) fn from_record(root: Record) -> Self {
        Self { root }
    }

    /// Parses SDP in strict mode.
    ///
    /// # Example
    /// ```
    /// use sdp_decode::SessionDescription;
    ///
    /// let sdp_text = "v=0\r\n\
    ///                 o=alice 123456 0 IN IP4 192.168.1.100\r\n\
    ///                 s=VoIP Call\r\n\
    ///                 c=IN IP4 192.168.1.100\r\n\
    ///                 t=0 0\r\n\
    ///                 m=audio 8000 RTP/AVP 0 8\r\n\
    ///                 a=rtpmap:0 PCMU/8000\r\n\
    ///                 a=rtpmap:8 PCMA/8000\r\n";
    ///
    /// let sdp = SessionDescription::parse(sdp_text).unwrap();
    /// assert_eq!(sdp.name(), Some("VoIP Call"));
    /// assert_eq!(sdp.media().count(), 1);
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        crate::parse::parse(input, ParseMode::Strict)
    }

    /// Parses SDP in relaxed mode.
    pub fn parse_relaxed(input: &str) -> Result<Self, ParseError> {
        crate::parse::parse(input, ParseMode::Relaxed)
    }

    /// Raw top-level value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn version(&self) -> Option<i128> {
        self.get("version").and_then(Value::as_integer)
    }

    /// `o=` fields: username, session_id, session_version, network_type,
    /// address_type, address.
    pub fn origin(&self) -> Option<&Record> {
        self.get("origin").and_then(Value::as_record)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_text)
    }

    pub fn information(&self) -> Option<&str> {
        self.get("information").and_then(Value::as_text)
    }

    pub fn uri(&self) -> Option<&str> {
        self.get("uri").and_then(Value::as_text)
    }

    pub fn emails(&self) -> impl Iterator<Item = &str> {
        texts(&self.root, "email")
    }

    pub fn phones(&self) -> impl Iterator<Item = &str> {
        texts(&self.root, "phone")
    }

    /// Session-level `c=` fields: network_type, address_type, address.
    pub fn connection(&self) -> Option<&Record> {
        self.get("connection").and_then(Value::as_record)
    }

    pub fn bandwidth(&self) -> impl Iterator<Item = &Record> {
        records(&self.root, "bandwidth")
    }

    /// `t=` entries in input order; each may carry a `repeat` sequence.
    pub fn timing(&self) -> impl Iterator<Item = &Record> {
        records(&self.root, TIMING)
    }

    /// `z=` adjustment/offset pairs.
    pub fn timezones(&self) -> impl Iterator<Item = &Record> {
        records(&self.root, "timezone")
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.get("encryption_key").and_then(Value::as_text)
    }

    /// Session-level `a=` records.
    pub fn attributes(&self) -> impl Iterator<Item = &Record> {
        records(&self.root, ATTRIBUTES)
    }

    /// Value of the first session attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        attribute_value(&self.root, name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        find_attribute(&self.root, name).is_some()
    }

    pub fn media(&self) -> impl Iterator<Item = MediaDescription<'_>> {
        records(&self.root, MEDIA_DESCRIPTIONS).map(MediaDescription::new)
    }

    /// First media description of `media_type`.
    ///
    /// # Example
    /// ```
    /// use sdp_decode::SessionDescription;
    ///
    /// let sdp = SessionDescription::parse(
    ///     "v=0\no=bob 456 0 IN IP4 10.0.0.1\ns=Conference\n\
    ///      m=audio 9000 RTP/AVP 0\nm=video 9002 RTP/AVP 96\n",
    /// )
    /// .unwrap();
    ///
    /// let video = sdp.find_media("video").unwrap();
    /// assert_eq!(video.port(), Some(9002));
    /// ```
    pub fn find_media(&self, media_type: &str) -> Option<MediaDescription<'_>> {
        self.media()
            .find(|media| media.media_type() == Some(media_type))
    }

    pub fn find_all_media<'a>(
        &'a self,
        media_type: &'a str,
    ) -> impl Iterator<Item = MediaDescription<'a>> + 'a {
        self.media()
            .filter(move |media| media.media_type() == Some(media_type))
    }

    pub fn as_record(&self) -> &Record {
        &self.root
    }

    pub fn into_record(self) -> Record {
        self.root
    }
}

/// View of one `m=` entry and the lines attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaDescription<'a> {
    record: &'a Record,
}

impl<'a> MediaDescription<'a> {
    fn new(record: &'a Record) -> Self {
        Self { record }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.record.get(key)
    }

    pub fn media_type(&self) -> Option<&'a str> {
        self.get("media_type").and_then(Value::as_text)
    }

    /// Port as an integer; `None` if a custom decoder produced another shape.
    pub fn port(&self) -> Option<u16> {
        self.get("port")
            .and_then(Value::as_integer)
            .and_then(|port| u16::try_from(port).ok())
    }

    pub fn protocol(&self) -> Option<&'a str> {
        self.get("protocol").and_then(Value::as_text)
    }

    pub fn formats(&self) -> impl Iterator<Item = &'a str> {
        texts(self.record, "format")
    }

    pub fn information(&self) -> Option<&'a str> {
        self.get("information").and_then(Value::as_text)
    }

    pub fn connections(&self) -> impl Iterator<Item = &'a Record> {
        records(self.record, "connection")
    }

    pub fn bandwidth(&self) -> impl Iterator<Item = &'a Record> {
        records(self.record, "bandwidth")
    }

    pub fn attributes(&self) -> impl Iterator<Item = &'a Record> {
        records(self.record, ATTRIBUTES)
    }

    /// Value of the first attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        attribute_value(self.record, name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        find_attribute(self.record, name).is_some()
    }

    pub fn encryption_key(&self) -> Option<&'a str> {
        self.get("encryption_key").and_then(Value::as_text)
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }
}

fn items<'a>(level: &'a Record, key: &str) -> &'a [Value] {
    level.get(key).and_then(Value::as_list).unwrap_or_default()
}

fn records<'a>(level: &'a Record, key: &str) -> impl Iterator<Item = &'a Record> {
    items(level, key).iter().filter_map(Value::as_record)
}

fn texts<'a>(level: &'a Record, key: &str) -> impl Iterator<Item = &'a str> {
    items(level, key).iter().filter_map(Value::as_text)
}

fn find_attribute<'a>(level: &'a Record, name: &str) -> Option<&'a Record> {
    records(level, ATTRIBUTES)
        .find(|attr| attr.get("attribute").and_then(Value::as_text) == Some(name))
}

fn attribute_value<'a>(level: &'a Record, name: &str) -> Option<&'a str> {
    find_attribute(level, name)?
        .get("value")
        .and_then(Value::as_text)
}
