//! POSIX shell quoting.

/// Wraps `value` in single quotes so the shell reads it as one word.
///
/// Embedded single quotes become `'"'"'`: close the quote, emit a
/// double-quoted `'`, reopen.
#[must_use]
pub fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

/// Wraps `value` in double quotes, escaping the characters the shell still
/// interprets there (`\`, `"`, `$` and backtick).
#[must_use]
pub fn double_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
