//! Escaping of reserved characters for markup output.
//!
//! Pure functions, total over all strings. The string writer delegates to
//! these; no other component escapes anything. CDATA content is emitted
//! verbatim and does not pass through here.

use std::fmt::Write;

/// Writes a hexadecimal character reference (`&#xHH;`) for a code point.
fn push_hex_char_ref(out: &mut String, ch: char) {
    let _ = write!(out, "&#x{:X};", ch as u32);
}

/// Escapes text content for markup output.
///
/// - `<`, `>`, `&` become named entity references
/// - `\r` becomes `&#13;` (literal carriage returns would be normalized
///   away by a reader)
/// - `\t` and `\n` pass through
/// - other control characters below 0x20 are hex-encoded
///
/// # Examples
///
/// ```
/// use xmlforge::escape::escape_text;
///
/// assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
/// ```
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            '\t' | '\n' => out.push(ch),
            c if (c as u32) < 0x20 => push_hex_char_ref(&mut out, c),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes an attribute value for markup output.
///
/// Like [`escape_text`], plus `"` becomes `&quot;` (values are serialized
/// double-quoted) and whitespace control characters are numeric so they
/// survive attribute-value normalization.
///
/// # Examples
///
/// ```
/// use xmlforge::escape::escape_attribute_value;
///
/// assert_eq!(
///     escape_attribute_value("say \"hi\" & wave"),
///     "say &quot;hi&quot; &amp; wave"
/// );
/// ```
#[must_use]
pub fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if (c as u32) < 0x20 => push_hex_char_ref(&mut out, c),
            _ => out.push(ch),
        }
    }
    out
}
