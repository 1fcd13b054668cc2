use super::{PropertyMap, PropsError, PropsResult};

/// One key/value line after continuation joining.
struct LogicalLine {
    /// 1-based physical line where the logical line starts.
    number: usize,
    text: String,
}

/// Parses record text into a property map.
///
/// # Errors
/// - `MalformedUnicodeEscape` / `UnpairedSurrogate` when a `\u` escape in a
///   key or value cannot be decoded.
pub fn load(text: &str) -> PropsResult<PropertyMap> {
    let mut map = PropertyMap::new();
    for line in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&line.text);
        let key = unescape(raw_key, line.number)?;
        let value = unescape(raw_value, line.number)?;
        map.insert(key, value);
    }
    Ok(map)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn physical_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'\n' => {
                lines.push(&text[start..index]);
                index += 1;
                start = index;
            }
            b'\r' => {
                lines.push(&text[start..index]);
                index += 1;
                if bytes.get(index) == Some(&b'\n') {
                    index += 1;
                }
                start = index;
            }
            _ => index += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (index, raw) in physical_lines(text).into_iter().enumerate() {
        let stripped = raw.trim_start_matches(is_blank);
        let joined = continues(stripped);
        let body = if joined {
            &stripped[..stripped.len() - 1]
        } else {
            stripped
        };

        match pending.as_mut() {
            Some(line) => line.text.push_str(body),
            None => {
                // Comment markers only count at the start of a logical line.
                if stripped.is_empty() || stripped.starts_with('#') || stripped.starts_with('!') {
                    continue;
                }
                pending = Some(LogicalLine {
                    number: index + 1,
                    text: body.to_string(),
                });
            }
        }

        if !joined {
            if let Some(line) = pending.take() {
                out.push(line);
            }
        }
    }

    if let Some(line) = pending {
        out.push(line);
    }
    out
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (index, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = index;
                value_start = index + 1;
                has_separator = true;
                break;
            }
            c if is_blank(c) => {
                key_end = index;
                value_start = index + c.len_utf8();
                break;
            }
            _ => {}
        }
    }

    let rest = &line[value_start..];
    let mut offset = 0;
    for ch in rest.chars() {
        if is_blank(ch) {
            offset += ch.len_utf8();
        } else if !has_separator && (ch == '=' || ch == ':') {
            has_separator = true;
            offset += 1;
        } else {
            break;
        }
    }

    (&line[..key_end], &rest[offset..])
}

fn read_hex_unit(chars: &mut std::str::Chars<'_>, line: usize) -> PropsResult<u32> {
    let mut unit = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or(PropsError::MalformedUnicodeEscape { line })?;
        unit = unit * 16 + digit;
    }
    Ok(unit)
}

fn unescape(raw: &str, line: usize) -> PropsResult<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let unit = read_hex_unit(&mut chars, line)?;
                let decoded = match unit {
                    0xD800..=0xDBFF => {
                        if chars.next() != Some('\\') || chars.next() != Some('u') {
                            return Err(PropsError::UnpairedSurrogate { line });
                        }
                        let low = read_hex_unit(&mut chars, line)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(PropsError::UnpairedSurrogate { line });
                        }
                        0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => return Err(PropsError::UnpairedSurrogate { line }),
                    other => other,
                };
                let decoded =
                    char::from_u32(decoded).ok_or(PropsError::MalformedUnicodeEscape { line })?;
                out.push(decoded);
            }
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
