// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic value tree produced by the field decoder.
//!
//! Decode functions are replaceable, so the type of a field is only known
//! once its decoder has run: the default `port` decoder yields
//! [`Value::Integer`], a caller-supplied one may yield [`Value::Text`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use smol_str::SmolStr;
use std::fmt;
use std::net::IpAddr;

/// Decoded connection address: `address[/ttl][/count]`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConnectionAddress {
    pub address: IpAddr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl ConnectionAddress {
    pub fn new(address: IpAddr) -> Self {
        Self {
            address,
            ttl: None,
            count: None,
        }
    }
}

impl fmt::Display for ConnectionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        match (self.ttl, self.count) {
            (Some(ttl), Some(count)) => write!(f, "/{}/{}", ttl, count),
            (Some(ttl), None) => write!(f, "/{}", ttl),
            (None, Some(count)) => write!(f, "//{}", count),
            (None, None) => Ok(()),
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(SmolStr),
    Integer(i128),
    Address(ConnectionAddress),
    Record(Record),
    List(Vec<Value>),
}

impl Value {
    pub fn text(s: impl Into<SmolStr>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&ConnectionAddress> {
        match self {
            Value::Address(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true if the value's textual form is one of `candidates`.
    ///
    /// Only scalar values take part; records and lists never match.
    pub fn is_one_of(&self, candidates: &[&str]) -> bool {
        match self {
            Value::Text(s) => candidates.contains(&s.as_str()),
            Value::Integer(n) => candidates.iter().any(|c| c.parse::<i128>() == Ok(*n)),
            Value::Address(_) | Value::Record(_) | Value::List(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Address(addr) => write!(f, "{}", addr),
            Value::Record(record) => write!(f, "{}", record),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Insertion-ordered map from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(SmolStr, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets `key`, returning the previous value if there was one.
    pub fn set(&mut self, key: impl Into<SmolStr>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Appends to the sequence under `key`, creating it on first use.
    ///
    /// Returns the sequence length after the push.
    pub fn push_to(&mut self, key: impl Into<SmolStr>, value: Value) -> usize {
        let key = key.into();
        if let Some(Value::List(items)) = self.get_mut(&key) {
            items.push(value);
            return items.len();
        }
        self.set(key, Value::List(vec![value]));
        1
    }

    /// Returns the last entry of the sequence under `key`, if it is a record.
    pub fn last_record_mut(&mut self, key: &str) -> Option<&mut Record> {
        match self.get_mut(key) {
            Some(Value::List(items)) => match items.last_mut() {
                Some(Value::Record(record)) => Some(record),
                _ => None,
            },
            _ => None,
        }
    }

    /// Length of the sequence under `key`, zero if absent.
    pub fn list_len(&self, key: &str) -> usize {
        self.get(key)
            .and_then(Value::as_list)
            .map(<[Value]>::len)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

impl FromIterator<(SmolStr, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (SmolStr, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn set_replaces_existing_key() {
        let mut record = Record::new();
        assert_eq!(record.set("name", Value::text("first")), None);
        assert_eq!(
            record.set("name", Value::text("second")),
            Some(Value::text("first"))
        );
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("name").and_then(Value::as_text), Some("second"));
    }

    #[test]
    fn push_to_creates_and_extends_sequence() {
        let mut record = Record::new();
        assert_eq!(record.push_to("email", Value::text("a@example.com")), 1);
        assert_eq!(record.push_to("email", Value::text("b@example.com")), 2);
        let emails = record.get("email").and_then(Value::as_list).unwrap();
        assert_eq!(emails[0].as_text(), Some("a@example.com"));
        assert_eq!(emails[1].as_text(), Some("b@example.com"));
    }

    #[test]
    fn last_record_mut_targets_most_recent_entry() {
        let mut root = Record::new();
        root.push_to("media_descriptions", Value::Record(Record::new()));
        root.push_to("media_descriptions", Value::Record(Record::new()));
        root.last_record_mut("media_descriptions")
            .unwrap()
            .set("information", Value::text("second"));

        let media = root.get("media_descriptions").and_then(Value::as_list).unwrap();
        assert!(media[0].as_record().unwrap().is_empty());
        assert_eq!(
            media[1].as_record().unwrap().get("information"),
            Some(&Value::text("second"))
        );
    }

    #[test]
    fn is_one_of_compares_textual_form() {
        assert!(Value::text("IN").is_one_of(&["IN"]));
        assert!(!Value::text("in").is_one_of(&["IN"]));
        assert!(Value::Integer(0).is_one_of(&["0"]));
        assert!(!Value::Record(Record::new()).is_one_of(&["{}"]));
    }

    #[test]
    fn displays_connection_address_forms() {
        let mut addr = ConnectionAddress::new(IpAddr::V4(Ipv4Addr::new(224, 2, 1, 1)));
        assert_eq!(addr.to_string(), "224.2.1.1");
        addr.ttl = Some(127);
        assert_eq!(addr.to_string(), "224.2.1.1/127");
        addr.count = Some(3);
        assert_eq!(addr.to_string(), "224.2.1.1/127/3");
        addr.ttl = None;
        assert_eq!(addr.to_string(), "224.2.1.1//3");
    }

    #[test]
    fn record_serializes_as_ordered_map() {
        let mut record = Record::new();
        record.set("version", Value::Integer(0));
        record.set("name", Value::text("Call"));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"version":0,"name":"Call"}"#);
    }
}
