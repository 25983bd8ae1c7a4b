//! Output escaping for database values
//!
//! The response is served as `text/plain`, but browsers and proxies have been
//! known to sniff and re-render it, so every name is markup-escaped first.

/// Escape markup metacharacters.
///
/// Replaces `&`, `<`, `>`, `"`, `'` and line breaks with their entity forms.
pub fn escape_markup(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            // a raw line break would let a name forge extra listing lines
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render product names as `Found product: <name>` lines, escaped, in order.
pub fn render_listing<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = String::new();
    for name in names {
        body.push_str("Found product: ");
        body.push_str(&escape_markup(name.as_ref()));
        body.push('\n');
    }
    body
}
