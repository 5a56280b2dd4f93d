//! Text helpers shared by the store and the acquisition strategies.

/// Strip an anchor fragment (`#...`) from a resource identifier.
///
/// Every cache key goes through this, so `app.js` and `app.js#L10` address
/// the same entry.
///
/// ```
/// use sourcecache_core::utils::remove_anchor;
///
/// assert_eq!(remove_anchor("http://a/app.js#L10"), "http://a/app.js");
/// assert_eq!(remove_anchor("http://a/app.js"), "http://a/app.js");
/// ```
pub fn remove_anchor(id: &str) -> &str {
    id.find('#').map_or(id, |index| &id[..index])
}

/// Split text into lines, keeping each line's terminator.
///
/// `\r\n`, `\n` and a lone `\r` all end a line. A trailing empty segment is
/// dropped, so joining the result with `""` reproduces the input exactly.
///
/// ```
/// use sourcecache_core::utils::split_lines;
///
/// assert_eq!(split_lines("a\r\nb\nc"), vec!["a\r\n", "b\n", "c"]);
/// assert_eq!(split_lines("a\n"), vec!["a\n"]);
/// assert!(split_lines("").is_empty());
/// ```
pub fn split_lines(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    // Terminators are ASCII, so byte offsets always land on char boundaries.
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                i += 1;
                lines.push(text[start..i].to_string());
                start = i;
            },
            b'\r' => {
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                lines.push(text[start..i].to_string());
                start = i;
            },
            _ => i += 1,
        }
    }

    if start < text.len() {
        lines.push(text[start..].to_string());
    }

    lines
}

/// Safely truncate a string at a valid UTF-8 boundary
///
/// Used to keep log previews of stored text short without panicking on
/// multi-byte characters.
///
/// ```
/// use sourcecache_core::utils::safe_truncate;
///
/// let text = "Hello 世界";
/// assert_eq!(safe_truncate(text, 5), "Hello");
/// assert_eq!(safe_truncate(text, 8), "Hello "); // Won't cut in middle of 世
/// ```
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut last_valid_end = 0;
    for (i, c) in s.char_indices() {
        let char_end = i + c.len_utf8();
        if char_end <= max_bytes {
            last_valid_end = char_end;
        } else {
            break;
        }
    }

    &s[..last_valid_end]
}
