// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use proptest::prelude::*;
use sdp_decode::{parse, ParseError, ParseMode, Value};

const HEADER: &str = "v=0\r\no=- 1 1 IN IP4 192.0.2.1\r\ns=-\r\n";

fn tag() -> impl Strategy<Value = char> {
    prop::sample::select(vec![
        'v', 'o', 's', 'i', 'u', 'e', 'p', 'c', 'b', 't', 'r', 'z', 'k', 'a', 'm', 'x',
    ])
}

proptest! {
    /// Test that arbitrary input never panics in either mode.
    #[test]
    fn arbitrary_input_never_panics(lines in prop::collection::vec("\\PC{0,40}", 0..10)) {
        let input = lines.join("\n");
        let _ = parse(&input, ParseMode::Strict);
        let _ = parse(&input, ParseMode::Relaxed);
    }

    /// Test that relaxed mode never reports an order violation.
    #[test]
    fn relaxed_mode_skips_instead_of_failing(
        lines in prop::collection::vec((tag(), "[a-z0-9 ]{0,12}"), 0..30),
    ) {
        let input: String = lines
            .iter()
            .map(|(tag, value)| format!("{}={}\n", tag, value))
            .collect();

        let result = parse(&input, ParseMode::Relaxed);
        prop_assert!(
            !matches!(result, Err(ParseError::IllegalLineOrder { .. })),
            "order violation for {:?}",
            input
        );
    }

    /// Test that every t= line produces one timing entry, in order.
    #[test]
    fn timing_entries_match_input(times in prop::collection::vec((0u32..u32::MAX, 0u32..u32::MAX), 1..10)) {
        let mut input = HEADER.to_string();
        for (start, stop) in &times {
            input.push_str(&format!("t={} {}\r\n", start, stop));
        }

        let sdp = parse(&input, ParseMode::Strict).expect("parse");
        let decoded: Vec<_> = sdp
            .timing()
            .map(|t| {
                (
                    t.get("start").and_then(Value::as_integer),
                    t.get("stop").and_then(Value::as_integer),
                )
            })
            .collect();
        let expected: Vec<_> = times
            .iter()
            .map(|(start, stop)| (Some(i128::from(*start)), Some(i128::from(*stop))))
            .collect();
        prop_assert_eq!(decoded, expected);
    }

    /// Test that media attributes land on the media entry they follow.
    #[test]
    fn media_attributes_stay_with_their_media(
        counts in prop::collection::vec(0usize..5, 1..6),
        port in 1024u16..65535,
    ) {
        let mut input = HEADER.to_string();
        for (i, count) in counts.iter().enumerate() {
            input.push_str(&format!("m=audio {} RTP/AVP {}\r\n", port, i));
            for n in 0..*count {
                input.push_str(&format!("a=fmtp:{} mode={}\r\n", i, n));
            }
        }

        let sdp = parse(&input, ParseMode::Strict).expect("parse");
        let media: Vec<_> = sdp.media().collect();
        prop_assert_eq!(media.len(), counts.len());
        for (entry, count) in media.iter().zip(&counts) {
            prop_assert_eq!(entry.attributes().count(), *count);
            prop_assert_eq!(entry.port(), Some(port));
        }
    }

    /// Test that IPv4 unicast connection addresses decode with optional TTL.
    #[test]
    fn ipv4_connection_addresses(
        octets in prop::array::uniform4(1u8..224),
        ttl in proptest::option::of(0u8..=255),
    ) {
        let host = format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]);
        let address = match ttl {
            Some(ttl) => format!("{}/{}", host, ttl),
            None => host.clone(),
        };
        let input = format!("{}c=IN IP4 {}\r\n", HEADER, address);

        let sdp = parse(&input, ParseMode::Strict).expect("parse");
        let decoded = sdp
            .connection()
            .and_then(|c| c.get("address"))
            .and_then(Value::as_address)
            .expect("address");
        prop_assert_eq!(decoded.address.to_string(), host);
        prop_assert_eq!(decoded.ttl, ttl);
    }
}
