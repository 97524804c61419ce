//! Line protocol escaping.
//!
//! Each position in a line protocol line has its own set of characters that
//! must be backslash-escaped. See [`EscapeClass`].

use std::borrow::Cow;

/// Which part of a line protocol line a string is written into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapeClass {
    /// Measurement name: space and comma.
    Measurement,
    /// Tag key, tag value or field key: space, comma and equals sign.
    Key,
    /// Double-quoted string field value: double quote and backslash.
    StringField,
}

impl EscapeClass {
    fn must_escape(self, c: char) -> bool {
        match self {
            EscapeClass::Measurement => matches!(c, ' ' | ','),
            EscapeClass::Key => matches!(c, ' ' | ',' | '='),
            EscapeClass::StringField => matches!(c, '"' | '\\'),
        }
    }
}

/// Escape `s` for the given position. Borrows when nothing needs escaping.
pub fn escape(s: &str, class: EscapeClass) -> Cow<'_, str> {
    if !s.chars().any(|c| class.must_escape(c)) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 4);
    write_escaped(&mut out, s, class);
    Cow::Owned(out)
}

/// Append `s` to `out`, escaped for the given position.
pub fn write_escaped(out: &mut String, s: &str, class: EscapeClass) {
    for c in s.chars() {
        if class.must_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Reverse [`escape`]: drop the backslash in front of any escapable character.
///
/// Backslashes not followed by a character of `class` are kept as-is.
pub fn unescape(s: &str, class: EscapeClass) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if class.must_escape(next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    Cow::Owned(out)
}
