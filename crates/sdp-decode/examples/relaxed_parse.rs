// siphon-rs - The Siphon SIP Stack
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decodes a sloppy SDP offer in relaxed mode.
//!
//! The offer has a bad version, an `s=` line before `o=` and a private
//! `x=` line. Each recovery is logged through `tracing`.
//!
//! Usage:
//! ```bash
//! cargo run --example relaxed_parse
//! ```

use sdp_decode::{parse_with, FieldType, ParserConfig, Value};

const OFFER: &str = "v=1.0\r\n\
s=Early name\r\n\
o=alice 2890844526 2890842807 IN IP4 192.0.2.10\r\n\
s=Team call\r\n\
c=IN IP4 192.0.2.10\r\n\
t=0 0\r\n\
x=vendor-extension\r\n\
m=audio 49170 RTP/AVP 0 8 101\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=rtpmap:8 PCMA/8000\r\n\
a=rtpmap:101 telephone-event/8000\r\n\
a=sendrecv\r\n\
m=video 51372 RTP/AVP 96\r\n\
b=AS:512\r\n\
a=rtpmap:96 VP8/90000\r\n";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = ParserConfig::relaxed();
    let sdp = parse_with(OFFER, &config)?;

    println!("version: {:?}", sdp.version());
    println!("session: {}", sdp.name().unwrap_or("-"));
    for media in sdp.media() {
        println!(
            "  {} port {} proto {} formats {:?}",
            media.media_type().unwrap_or("?"),
            media.port().map(|p| p.to_string()).unwrap_or_default(),
            media.protocol().unwrap_or("?"),
            media.formats().collect::<Vec<_>>()
        );
        for attr in media.attributes() {
            println!("    a={}", attr);
        }
    }

    // Same input, ports kept as text
    let textual = config.with_decoder(FieldType::Port, |raw: &str| Ok(Value::text(raw)));
    let sdp = parse_with(OFFER, &textual)?;
    println!("\nJSON: {}", serde_json::to_string_pretty(&sdp)?);

    Ok(())
}
