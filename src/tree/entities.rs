//! Character and entity reference decoding.

use alloc::{borrow::Cow, string::String};

use memchr::memchr;

/// Decode entity references in text, borrowing when there are none.
///
/// Unknown or malformed references are kept verbatim.
pub(super) fn decode(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();

    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(text);
    };

    let mut decoded = String::with_capacity(text.len());
    decoded.push_str(&text[..first]);

    let mut i = first;
    while i < bytes.len() {
        let Some(amp) = memchr(b'&', &bytes[i..]).map(|j| i + j) else {
            decoded.push_str(&text[i..]);
            break;
        };

        decoded.push_str(&text[i..amp]);

        // References are short; don't scan the whole document for a `;`.
        let window = &bytes[amp + 1..bytes.len().min(amp + 12)];

        match memchr(b';', window).and_then(|semi| {
            let c = resolve(&text[amp + 1..amp + 1 + semi])?;
            Some((c, amp + semi + 2))
        }) {
            Some((c, next)) => {
                decoded.push(c);
                i = next;
            }
            None => {
                decoded.push('&');
                i = amp + 1;
            }
        }
    }

    Cow::Owned(decoded)
}

/// Resolve the body of a reference (between `&` and `;`).
fn resolve(reference: &str) -> Option<char> {
    if let Some(number) = reference.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };

        return char::from_u32(code);
    }

    Some(match reference {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => return None,
    })
}
