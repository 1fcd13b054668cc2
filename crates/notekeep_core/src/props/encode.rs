use super::PropertyMap;

/// Serializes `map` into record text.
///
/// Layout: optional `#comment` lines, one `#timestamp` line, then one
/// `key=value` line per entry in key order. Lines end with `\n`.
pub fn store(map: &PropertyMap, comments: Option<&str>, timestamp: &str) -> String {
    let mut out = String::new();
    if let Some(comments) = comments {
        for line in comments.lines() {
            out.push('#');
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('#');
    out.push_str(timestamp);
    out.push('\n');

    for (key, value) in map {
        escape_into(key, true, &mut out);
        out.push('=');
        escape_into(value, false, &mut out);
        out.push('\n');
    }
    out
}

fn escape_into(text: &str, is_key: bool, out: &mut String) {
    for (index, ch) in text.chars().enumerate() {
        match ch {
            // Values only need the leading space escaped; the reader strips
            // whitespace before a value starts.
            ' ' if is_key || index == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(ch);
            }
            c if (c as u32) < 0x20 || c == '\x7f' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
}
