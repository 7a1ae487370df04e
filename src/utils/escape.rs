//! HTML entity escaping for values persisted to the stores
//!
//! Short tokens and target URLs come from an external document and are later
//! rendered into pages and reports, so both are entity-escaped at write time.

use std::borrow::Cow;

/// Escapes `&`, `<`, `>`, `"` and `'` as HTML entities.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping, which
/// is the common case for short tokens.
pub fn html_escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_input_is_borrowed() {
        let out = html_escape("gtlb");
        assert!(matches!(out, Cow::Borrowed("gtlb")));
    }

    #[test]
    fn escapes_all_special_characters() {
        assert_eq!(
            html_escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn escapes_query_string_ampersands() {
        assert_eq!(
            html_escape("https://example.com/?a=1&b=2"),
            "https://example.com/?a=1&amp;b=2"
        );
    }
}
