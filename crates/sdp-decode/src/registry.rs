// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decode functions for atomic field values.
//!
//! A [`DecoderRegistry`] maps each [`FieldType`] to a function
//! `&str -> Result<Value, DecodeFailure>`. The built-in table is created
//! once per process; callers derive their own registry from it with
//! [`DecoderRegistry::with_decoder`] or [`DecoderRegistry::merge`] and hand
//! it to the parser through [`ParserConfig`](crate::ParserConfig).

use crate::error::DecodeFailure;
use crate::value::{ConnectionAddress, Value};
use once_cell::sync::Lazy;
use smol_str::SmolStr;
use std::fmt;
use std::net::IpAddr;
use std::num::IntErrorKind;
use std::str::FromStr;
use std::sync::Arc;

/// A decode function.
pub type DecodeFn = Arc<dyn Fn(&str) -> Result<Value, DecodeFailure> + Send + Sync>;

/// Field types understood by the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Integer,
    NumericString,
    Instant,
    Duration,
    IpAddress,
    Port,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::NumericString,
        FieldType::Instant,
        FieldType::Duration,
        FieldType::IpAddress,
        FieldType::Port,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::NumericString => "numeric-string",
            FieldType::Instant => "instant",
            FieldType::Duration => "duration",
            FieldType::IpAddress => "ip-address",
            FieldType::Port => "port",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a [`FieldType`] from an unknown name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldType(pub SmolStr);

impl fmt::Display for UnknownFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field type: {}", self.0)
    }
}

impl std::error::Error for UnknownFieldType {}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownFieldType(SmolStr::new(s)))
    }
}

static BUILTIN: Lazy<DecoderRegistry> = Lazy::new(DecoderRegistry::build_builtin);

/// Table of decode functions, one per [`FieldType`].
#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: [DecodeFn; 7],
}

impl DecoderRegistry {
    /// The built-in decoders.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    fn build_builtin() -> Self {
        let decoders: [DecodeFn; 7] = [
            Arc::new(decode_string),
            Arc::new(decode_integer),
            Arc::new(decode_numeric_string),
            Arc::new(decode_instant),
            Arc::new(decode_duration),
            Arc::new(decode_ip_address),
            Arc::new(decode_port),
        ];
        Self { decoders }
    }

    /// Replaces the decoder for `field_type`.
    pub fn with_decoder<F>(mut self, field_type: FieldType, decoder: F) -> Self
    where
        F: Fn(&str) -> Result<Value, DecodeFailure> + Send + Sync + 'static,
    {
        self.decoders[field_type.index()] = Arc::new(decoder);
        self
    }

    /// Merges `overrides` over the current table; later entries win.
    pub fn merge<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (FieldType, DecodeFn)>,
    {
        for (field_type, decoder) in overrides {
            self.decoders[field_type.index()] = decoder;
        }
        self
    }

    pub fn get(&self, field_type: FieldType) -> &DecodeFn {
        &self.decoders[field_type.index()]
    }

    pub fn decode(&self, field_type: FieldType, raw: &str) -> Result<Value, DecodeFailure> {
        (self.get(field_type))(raw)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(FieldType::ALL.iter().map(|t| t.as_str()))
            .finish()
    }
}

/// `string`: the value as-is.
pub fn decode_string(raw: &str) -> Result<Value, DecodeFailure> {
    Ok(Value::text(raw))
}

/// `integer`: a signed decimal integer.
pub fn decode_integer(raw: &str) -> Result<Value, DecodeFailure> {
    parse_integer(raw).map(Value::Integer)
}

/// `numeric-string`: the value as-is, but only ASCII letters and digits.
pub fn decode_numeric_string(raw: &str) -> Result<Value, DecodeFailure> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DecodeFailure::new(format!(
            "'{}' is not alphanumeric",
            raw
        )));
    }
    Ok(Value::text(raw))
}

/// `instant`: NTP time; numeric values become integers, anything else passes through.
///
/// Values are held as `i128`. A numeric token outside that range is kept
/// as `Value::Text` rather than rejected.
pub fn decode_instant(raw: &str) -> Result<Value, DecodeFailure> {
    passthrough_time(raw, "instant")
}

/// `duration`: seconds or a unit-suffixed token (`7d`, `-1h`), passed through.
///
/// Like [`decode_instant`], a number that overflows `i128` stays `Value::Text`.
pub fn decode_duration(raw: &str) -> Result<Value, DecodeFailure> {
    passthrough_time(raw, "duration")
}

fn passthrough_time(raw: &str, what: &str) -> Result<Value, DecodeFailure> {
    if raw.is_empty() {
        return Err(DecodeFailure::new(format!("empty {}", what)));
    }
    Ok(match raw.parse::<i128>() {
        Ok(n) => Value::Integer(n),
        Err(_) => Value::text(raw),
    })
}

/// `port`: an integer in 0-65535.
pub fn decode_port(raw: &str) -> Result<Value, DecodeFailure> {
    integer_in_range(raw, 0, u16::MAX as i128).map(Value::Integer)
}

/// Parses `raw` as an integer and checks `min..=max`.
pub fn integer_in_range(raw: &str, min: i128, max: i128) -> Result<i128, DecodeFailure> {
    let n = parse_integer(raw)?;
    if n < min || n > max {
        return Err(DecodeFailure::new(format!(
            "{} out of range ({}-{})",
            n, min, max
        )));
    }
    Ok(n)
}

fn parse_integer(raw: &str) -> Result<i128, DecodeFailure> {
    raw.parse::<i128>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            DecodeFailure::new(format!("'{}' is out of range", raw))
        }
        _ => DecodeFailure::new(format!("'{}' is not an integer", raw)),
    })
}

/// `ip-address`: `address[/ttl][/count]` with a literal IPv4 or IPv6 address.
///
/// IPv4 multicast needs a TTL (0-255). IPv6 never takes a TTL; its count
/// follows an empty TTL segment (`ff0e::1//3`).
pub fn decode_ip_address(raw: &str) -> Result<Value, DecodeFailure> {
    let mut segments = raw.split('/');
    let host = segments.next().unwrap_or_default();
    let ttl = segments.next();
    let count = segments.next();
    if segments.next().is_some() {
        return Err(DecodeFailure::new(format!(
            "too many '/' segments in '{}'",
            raw
        )));
    }

    let address: IpAddr = host
        .parse()
        .map_err(|_| DecodeFailure::new(format!("'{}' is not an IPv4 or IPv6 address", host)))?;
    let ttl = ttl.filter(|s| !s.is_empty());

    let mut decoded = ConnectionAddress::new(address);
    match (address, ttl) {
        (IpAddr::V4(_), Some(ttl)) => {
            let ttl = integer_in_range(ttl, 0, 255)?;
            decoded.ttl = u8::try_from(ttl).ok();
        }
        (IpAddr::V4(v4), None) if v4.is_multicast() => {
            return Err(DecodeFailure::new("multicast IPv4 address requires a TTL"));
        }
        (IpAddr::V4(_), None) => {}
        (IpAddr::V6(_), Some(_)) => {
            return Err(DecodeFailure::new("TTL not allowed for IPv6"));
        }
        (IpAddr::V6(_), None) => {}
    }

    if let Some(count) = count {
        let count = count
            .parse::<u32>()
            .map_err(|_| DecodeFailure::new(format!("'{}' is not an address count", count)))?;
        decoded.count = Some(count);
    }

    Ok(Value::Address(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn address(raw: &str) -> ConnectionAddress {
        match decode_ip_address(raw) {
            Ok(Value::Address(addr)) => addr,
            other => panic!("expected address for {}, got {:?}", raw, other),
        }
    }

    #[test]
    fn unicast_ipv4_needs_no_ttl() {
        let addr = address("192.0.2.1");
        assert_eq!(addr.address, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(addr.ttl, None);
        assert_eq!(addr.count, None);
    }

    #[test]
    fn multicast_ipv4_requires_ttl() {
        let err = decode_ip_address("224.2.17.12").unwrap_err();
        assert_eq!(err.reason(), "multicast IPv4 address requires a TTL");

        let addr = address("224.2.17.12/127");
        assert_eq!(addr.ttl, Some(127));
        assert_eq!(addr.count, None);

        let addr = address("224.2.1.1/127/3");
        assert_eq!(addr.ttl, Some(127));
        assert_eq!(addr.count, Some(3));
    }

    #[test]
    fn ipv4_ttl_is_bounded() {
        assert!(decode_ip_address("224.2.1.1/255").is_ok());
        assert!(decode_ip_address("224.2.1.1/256").is_err());
        assert!(decode_ip_address("224.2.1.1/-1").is_err());
        assert!(decode_ip_address("224.2.1.1/abc").is_err());
    }

    #[test]
    fn ipv6_rejects_ttl() {
        let err = decode_ip_address("ff0e::1/127").unwrap_err();
        assert_eq!(err.reason(), "TTL not allowed for IPv6");

        let addr = address("ff0e::1");
        assert_eq!(
            addr.address,
            IpAddr::V6(Ipv6Addr::new(0xff0e, 0, 0, 0, 0, 0, 0, 1))
        );
        assert_eq!(addr.ttl, None);
    }

    #[test]
    fn ipv6_count_follows_empty_ttl() {
        let addr = address("ff0e::1//3");
        assert_eq!(addr.ttl, None);
        assert_eq!(addr.count, Some(3));
    }

    #[test]
    fn rejects_hostnames_and_extra_segments() {
        assert!(decode_ip_address("host.example.com").is_err());
        assert!(decode_ip_address("224.2.1.1/127/3/4").is_err());
        assert!(decode_ip_address("").is_err());
    }

    #[test]
    fn port_range_is_inclusive() {
        assert_eq!(decode_port("0"), Ok(Value::Integer(0)));
        assert_eq!(decode_port("65535"), Ok(Value::Integer(65535)));
        assert!(decode_port("65536").is_err());
        assert!(decode_port("-1").is_err());
        assert!(decode_port("http").is_err());
    }

    #[test]
    fn numeric_string_allows_letters_and_digits_only() {
        assert_eq!(decode_numeric_string("2890844526"), Ok(Value::text("2890844526")));
        assert_eq!(decode_numeric_string("abc123"), Ok(Value::text("abc123")));
        assert!(decode_numeric_string("12-34").is_err());
        assert!(decode_numeric_string("").is_err());
    }

    #[test]
    fn time_values_pass_through() {
        assert_eq!(decode_instant("3034423619"), Ok(Value::Integer(3034423619)));
        assert_eq!(
            decode_instant("99999999999999999999999999999"),
            Ok(Value::Integer(99999999999999999999999999999))
        );
        assert_eq!(decode_duration("7d"), Ok(Value::text("7d")));
        assert_eq!(decode_duration("-1h"), Ok(Value::text("-1h")));
        assert!(decode_duration("").is_err());
    }

    #[test]
    fn time_values_beyond_i128_stay_textual() {
        let huge = "1".repeat(50);
        assert_eq!(decode_instant(&huge), Ok(Value::text(huge.as_str())));
        assert_eq!(decode_duration(&huge), Ok(Value::text(huge.as_str())));
    }

    #[test]
    fn integer_overflow_is_out_of_range() {
        let huge = format!("-{}", "9".repeat(45));
        let err = decode_integer(&huge).unwrap_err();
        assert_eq!(err.reason(), format!("'{}' is out of range", huge));

        let err = decode_integer("12ab").unwrap_err();
        assert_eq!(err.reason(), "'12ab' is not an integer");
        assert!(decode_port(&"7".repeat(45))
            .unwrap_err()
            .reason()
            .contains("out of range"));
    }

    #[test]
    fn field_types_parse_from_names() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.as_str().parse::<FieldType>(), Ok(field_type));
        }
        assert_eq!(
            "float".parse::<FieldType>(),
            Err(UnknownFieldType(SmolStr::new("float")))
        );
    }

    #[test]
    fn overrides_replace_single_entries() {
        let registry = DecoderRegistry::builtin()
            .with_decoder(FieldType::Port, |raw| Ok(Value::text(raw)));
        assert_eq!(registry.decode(FieldType::Port, "49170"), Ok(Value::text("49170")));
        assert_eq!(
            registry.decode(FieldType::Integer, "49170"),
            Ok(Value::Integer(49170))
        );
        // The built-in table is untouched.
        assert_eq!(
            DecoderRegistry::builtin().decode(FieldType::Port, "49170"),
            Ok(Value::Integer(49170))
        );
    }

    #[test]
    fn merge_applies_in_order() {
        let first: DecodeFn = Arc::new(|_: &str| Ok(Value::text("first")));
        let second: DecodeFn = Arc::new(|_: &str| Ok(Value::text("second")));
        let registry = DecoderRegistry::builtin().merge(vec![
            (FieldType::String, first),
            (FieldType::String, second),
        ]);
        assert_eq!(registry.decode(FieldType::String, "x"), Ok(Value::text("second")));
    }
}
