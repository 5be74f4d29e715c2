//! POSIX shell quoting.

/// Quotes `s` as a single POSIX shell word.
///
/// The empty string becomes `''`. Anything else is wrapped in single quotes,
/// and each embedded `'` becomes `'\''` (close the quote, emit an escaped
/// quote, reopen). Inside single quotes no other character is special, so this
/// is the only escaping configuration values need.
///
/// # Examples
///
/// ```
/// use dbdump_pipeline::shell::quote;
///
/// assert_eq!(quote(""), "''");
/// assert_eq!(quote("orders"), "'orders'");
/// assert_eq!(quote("it's"), r"'it'\''s'");
/// ```
pub fn quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}
