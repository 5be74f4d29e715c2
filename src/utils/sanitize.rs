//! Utilities for sanitizing diagnostic text captured from child processes.
//!
//! Dump tools write arbitrary bytes to stderr. Before that text is placed in
//! an error value it is decoded lossily, stripped of control characters,
//! trimmed and truncated.

/// Sanitizes an error message by removing control characters.
///
/// Control characters (0x00-0x1F, except newline/tab/carriage return) can
/// garble terminals and log aggregators. This function removes them while
/// preserving readability.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .filter(|c| *c != '\u{7f}')
        .collect()
}

/// Sanitizes and truncates an error message to a maximum length.
///
/// This function:
/// 1. Sanitizes the message by removing control characters
/// 2. Truncates to `MAX_ERROR_MESSAGE_LENGTH` characters if necessary
/// 3. Appends a truncation indicator if the message was truncated
pub fn sanitize_and_truncate_error_message(message: &str) -> String {
    let sanitized = sanitize_error_message(message);
    let char_count = sanitized.chars().count();

    if char_count > crate::config::MAX_ERROR_MESSAGE_LENGTH {
        // Leave room for the truncation note
        let keep = crate::config::MAX_ERROR_MESSAGE_LENGTH.saturating_sub(50);
        let head: String = sanitized.chars().take(keep).collect();
        format!(
            "{}... (truncated, original length: {} chars)",
            head, char_count
        )
    } else {
        sanitized
    }
}

/// Turns raw stderr bytes into a trimmed, sanitized diagnostic string.
pub fn diagnostic_text(raw: &[u8]) -> String {
    let decoded = String::from_utf8_lossy(raw);
    sanitize_and_truncate_error_message(decoded.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_error_message_removes_control_chars() {
        let input = "Error\x00message\x01with\x02control\x03chars";
        let output = sanitize_error_message(input);
        assert_eq!(output, "Errormessagewithcontrolchars");
    }

    #[test]
    fn test_sanitize_error_message_preserves_newlines_and_tabs() {
        let input = "mysqldump: Got error\n\t1045: Access denied";
        assert_eq!(sanitize_error_message(input), input);
    }

    #[test]
    fn test_sanitize_error_message_strips_ansi_escape_introducer() {
        let input = "\x1b[31mred\x1b[0m";
        assert_eq!(sanitize_error_message(input), "[31mred[0m");
    }

    #[test]
    fn test_sanitize_error_message_preserves_unicode() {
        let input = "pg_dump: ошибка: 测试";
        assert_eq!(sanitize_error_message(input), input);
    }

    #[test]
    fn test_truncate_long_message() {
        let input = "x".repeat(5000);
        let output = sanitize_and_truncate_error_message(&input);
        assert!(output.starts_with(&"x".repeat(1950)));
        assert!(output.ends_with("(truncated, original length: 5000 chars)"));
        assert!(output.chars().count() < 2000);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let input = "é".repeat(3000);
        let output = sanitize_and_truncate_error_message(&input);
        assert!(output.contains("original length: 3000 chars"));
    }

    #[test]
    fn test_diagnostic_text_trims_and_decodes_lossily() {
        let raw = b"  \nmongodump: connection refused\xff\n\n";
        assert_eq!(diagnostic_text(raw), "mongodump: connection refused\u{fffd}");
    }

    #[test]
    fn test_diagnostic_text_empty() {
        assert_eq!(diagnostic_text(b""), "");
        assert_eq!(diagnostic_text(b"   \n"), "");
    }
}
