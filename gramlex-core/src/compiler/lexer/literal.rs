//! String literal decoding
//!
//! The scanner validates escapes but keeps token text verbatim; this turns a
//! `STRING_LITERAL` token's text into the characters it denotes.

/// Literal decoding errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LiteralError {
    #[error("literal is not enclosed in single quotes: {0}")]
    Unquoted(String),

    #[error("invalid escape sequence `{text}` at byte {offset}")]
    InvalidEscape { text: String, offset: usize },

    #[error("code point U+{0:X} is not a valid character")]
    InvalidCodePoint(u32),
}

/// Decode the text of a string literal token, quotes included
pub fn unescape_literal(text: &str) -> Result<String, LiteralError> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .ok_or_else(|| LiteralError::Unquoted(text.to_string()))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let invalid = |end: usize| LiteralError::InvalidEscape {
            text: inner[offset..end].to_string(),
            offset: offset + 1,
        };
        let Some((at, escaped)) = chars.next() else {
            return Err(invalid(inner.len()));
        };
        let decoded = match escaped {
            'b' => '\u{0008}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{000C}',
            'r' => '\r',
            '\'' => '\'',
            '\\' => '\\',
            'u' => {
                let braced = chars.next_if(|&(_, c)| c == '{').is_some();
                let limit = if braced { usize::MAX } else { 4 };
                let mut value: u32 = 0;
                let mut digits = 0usize;
                let mut end = at + 1 + usize::from(braced);
                while digits < limit {
                    let Some((pos, d)) = chars.next_if(|&(_, c)| c.is_ascii_hexdigit()) else {
                        break;
                    };
                    value = value.saturating_mul(16).saturating_add(d.to_digit(16).unwrap_or(0));
                    digits += 1;
                    end = pos + 1;
                }
                let closed = !braced || chars.next_if(|&(_, c)| c == '}').is_some();
                let counted = if braced {
                    (1..=6).contains(&digits)
                } else {
                    digits == 4
                };
                if !(closed && counted) {
                    return Err(invalid(end));
                }
                decode(value)?
            }
            _ => return Err(invalid(at + escaped.len_utf8())),
        };
        out.push(decoded);
    }
    Ok(out)
}

fn decode(value: u32) -> Result<char, LiteralError> {
    char::from_u32(value).ok_or(LiteralError::InvalidCodePoint(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_literal() {
        assert_eq!(unescape_literal("'abc'").unwrap(), "abc");
        assert_eq!(unescape_literal("''").unwrap(), "");
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape_literal(r"'\t\n\r'").unwrap(), "\t\n\r");
        assert_eq!(unescape_literal(r"'\\\''").unwrap(), "\\'");
        assert_eq!(unescape_literal(r"'\b\f'").unwrap(), "\u{0008}\u{000C}");
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(unescape_literal(r"'\u0041'").unwrap(), "A");
        assert_eq!(unescape_literal(r"'\u00412'").unwrap(), "A2");
        assert_eq!(unescape_literal(r"'\u{1F600}'").unwrap(), "\u{1F600}");
        assert_eq!(unescape_literal(r"'\u{1}'").unwrap(), "\u{1}");
    }

    #[test]
    fn test_invalid_escapes() {
        assert!(matches!(
            unescape_literal(r"'\u12'"),
            Err(LiteralError::InvalidEscape { .. })
        ));
        assert!(matches!(
            unescape_literal(r"'\u{1234567}'"),
            Err(LiteralError::InvalidEscape { .. })
        ));
        assert!(matches!(
            unescape_literal(r"'\q'"),
            Err(LiteralError::InvalidEscape { text, .. }) if text == r"\q"
        ));
        assert_eq!(
            unescape_literal(r"'\uD800'"),
            Err(LiteralError::InvalidCodePoint(0xD800))
        );
    }

    #[test]
    fn test_unquoted() {
        assert!(matches!(unescape_literal("abc"), Err(LiteralError::Unquoted(_))));
        assert!(matches!(unescape_literal("'"), Err(LiteralError::Unquoted(_))));
    }
}
