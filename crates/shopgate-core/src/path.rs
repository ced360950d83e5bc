//! # Path Canonicalization
//!
//! The gate must classify the same path the renderer will serve. URL
//! resolution downstream folds dot segments and backslashes, and it decodes
//! escaped unreserved characters, so `/item/../checkout`, `/./checkout` and
//! `/%63heckout` all name `/checkout`. [`canonical_path`] applies the same
//! folding up front:
//!
//! 1. `%XX` escapes of unreserved characters (`A-Z a-z 0-9 - . _ ~`) are
//!    decoded; every other escape is kept with upper-case hex, so `%2F`
//!    never turns into a separator. A `%` that starts no escape becomes `%25`.
//! 2. `\` is treated as `/`.
//! 3. Empty and `.` segments are dropped, and `..` removes the segment before
//!    it. Nothing climbs above the root.
//!
//! A trailing slash survives, and so does a trailing dot segment, which
//! resolves to its directory (`/orders/17/..` → `/orders/`).

use std::borrow::Cow;

/// Fold `raw` into the form the gate classifies and the renderer receives.
///
/// Returns the input unchanged (borrowed) when it is already canonical.
/// `canonical_path(canonical_path(p)) == canonical_path(p)` for every `p`.
pub fn canonical_path(raw: &str) -> Cow<'_, str> {
    let decoded = decode_unreserved(raw);

    let mut segments: Vec<&str> = Vec::new();
    let mut trailing_slash = false;
    for segment in decoded.split(|c: char| c == '/' || c == '\\') {
        trailing_slash = matches!(segment, "" | "." | "..");
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(decoded.len() + 1);
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() || trailing_slash {
        out.push('/');
    }

    if out == raw {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(out)
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn decode_unreserved(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while let Some(offset) = raw[i..].find('%') {
        let at = i + offset;
        out.push_str(&raw[i..at]);
        let escape = bytes
            .get(at + 1)
            .and_then(|&hi| hex_value(hi))
            .zip(bytes.get(at + 2).and_then(|&lo| hex_value(lo)))
            .map(|(hi, lo)| hi << 4 | lo);
        match escape {
            Some(byte) if is_unreserved(byte) => {
                out.push(char::from(byte));
                i = at + 3;
            }
            Some(_) => {
                out.push('%');
                out.push_str(&raw[at + 1..at + 3].to_ascii_uppercase());
                i = at + 3;
            }
            // A stray '%' is escaped so later decoding cannot pair it with
            // characters produced here.
            None => {
                out.push_str("%25");
                i = at + 1;
            }
        }
    }
    out.push_str(&raw[i..]);
    Cow::Owned(out)
}
