//! Java properties parsing for `-D:` definitions
//!
//! Supports the subset of `java.util.Properties` syntax people actually type
//! into a job configuration: `#`/`!` comments, `=`, `:` or whitespace
//! separators, backslash line continuations and escapes.

use nantrun_utils::error::BuildError;
use std::str::Chars;

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Parse `input` into `(key, value)` pairs in first-appearance order.
///
/// A key defined twice keeps its first position and takes the last value.
pub fn parse_properties(input: &str) -> Result<Vec<(String, String)>, BuildError> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for line in logical_lines(input) {
        let (raw_key, raw_value) = split_key_value(&line);
        let key = unescape(raw_key)?;
        let value = unescape(raw_value)?;

        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    Ok(entries)
}

/// Join continued lines and drop comments and blank lines.
fn logical_lines(input: &str) -> Vec<String> {
    let normalized = input.replace("\r\n", "\n");
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continuing = false;

    for raw in normalized.split(['\n', '\r']) {
        let line = raw.trim_start_matches(is_blank);

        if line.is_empty() {
            if continuing {
                lines.push(std::mem::take(&mut current));
                continuing = false;
            }
            continue;
        }
        if !continuing && (line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        let trailing_backslashes = line.chars().rev().take_while(|&c| c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            current.push_str(&line[..line.len() - 1]);
            continuing = true;
        } else {
            current.push_str(line);
            lines.push(std::mem::take(&mut current));
            continuing = false;
        }
    }

    if continuing && !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Split a logical line at the first unescaped separator.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut split = None;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                split = Some((i, i + 1, true));
                break;
            }
            c if is_blank(c) => {
                split = Some((i, i + c.len_utf8(), false));
                break;
            }
            _ => {}
        }
    }

    let Some((key_end, after, had_separator)) = split else {
        return (line, "");
    };

    let mut rest = line[after..].trim_start_matches(is_blank);
    if !had_separator && let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_blank);
    }

    (&line[..key_end], rest)
}

/// Resolve backslash escapes.
fn unescape(raw: &str) -> Result<String, BuildError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(decode_unicode_escape(&mut chars)?),
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

/// Read the four hex digits after `\u`.
fn read_code_unit(chars: &mut Chars<'_>) -> Result<u16, BuildError> {
    let hex: String = chars.by_ref().take(4).collect();
    (hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| u16::from_str_radix(&hex, 16).ok())
        .flatten()
        .ok_or_else(|| BuildError::InvalidProperties {
            reason: format!("malformed \\uxxxx encoding: \\u{hex}"),
        })
}

/// Decode a `\uXXXX` escape, joining a UTF-16 surrogate pair written as two escapes.
fn decode_unicode_escape(chars: &mut Chars<'_>) -> Result<char, BuildError> {
    let first = read_code_unit(chars)?;
    if (0xD800..=0xDBFF).contains(&first) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\')
            && lookahead.next() == Some('u')
            && let Ok(second) = read_code_unit(&mut lookahead)
            && (0xDC00..=0xDFFF).contains(&second)
        {
            *chars = lookahead;
            let code = 0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00);
            if let Some(c) = char::from_u32(code) {
                return Ok(c);
            }
        }
    }
    char::from_u32(u32::from(first)).ok_or_else(|| BuildError::InvalidProperties {
        reason: format!("unpaired surrogate in \\u{first:04X}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(input: &str) -> Vec<(String, String)> {
        parse_properties(input).unwrap()
    }

    fn kv(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_single_pair() {
        assert_eq!(pairs("a=1"), vec![kv("a", "1")]);
    }

    #[test]
    fn test_separators() {
        assert_eq!(
            pairs("a=1\nb:2\nc 3\nd = 4\ne : 5\nf\t6"),
            vec![
                kv("a", "1"),
                kv("b", "2"),
                kv("c", "3"),
                kv("d", "4"),
                kv("e", "5"),
                kv("f", "6"),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let input = "# comment\n\n   ! also comment\nconfiguration=Release\n";
        assert_eq!(pairs(input), vec![kv("configuration", "Release")]);
    }

    #[test]
    fn test_key_without_value() {
        assert_eq!(pairs("flag"), vec![kv("flag", "")]);
        assert_eq!(pairs("flag="), vec![kv("flag", "")]);
    }

    #[test]
    fn test_value_keeps_inner_separators() {
        assert_eq!(
            pairs("url=http://host:8080/a=b"),
            vec![kv("url", "http://host:8080/a=b")]
        );
    }

    #[test]
    fn test_value_keeps_trailing_whitespace() {
        assert_eq!(pairs("a=1  "), vec![kv("a", "1  ")]);
    }

    #[test]
    fn test_line_continuation() {
        let input = "list=one,\\\n    two,\\\n    three\nnext=1";
        assert_eq!(
            pairs(input),
            vec![kv("list", "one,two,three"), kv("next", "1")]
        );
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        assert_eq!(
            pairs("dir=C:\\\\build\\\\\nnext=1"),
            vec![kv("dir", "C:\\build\\"), kv("next", "1")]
        );
    }

    #[test]
    fn test_escaped_separator_in_key() {
        assert_eq!(pairs("a\\=b=c"), vec![kv("a=b", "c")]);
        assert_eq!(pairs("a\\ b=c"), vec![kv("a b", "c")]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            pairs("a=tab\\there\\nnl\\u0041\\q"),
            vec![kv("a", "tab\there\nnlAq")]
        );
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let err = parse_properties("a=\\u12").unwrap_err();
        assert!(matches!(err, BuildError::InvalidProperties { .. }));
        assert!(parse_properties("a=\\uZZZZ").is_err());
        assert!(parse_properties("a=\\u+041").is_err());
    }

    #[test]
    fn test_surrogate_pair_escape() {
        assert_eq!(pairs("emoji=\\uD83D\\uDE00!"), vec![kv("emoji", "\u{1F600}!")]);
        assert_eq!(pairs("e=\\u00e9"), vec![kv("e", "é")]);

        let err = parse_properties("a=\\uD83Dx").unwrap_err();
        assert!(err.to_string().contains("surrogate"), "{err}");
        assert!(parse_properties("a=\\uDE00").is_err());
    }

    #[test]
    fn test_duplicate_keys_keep_first_position_last_value() {
        assert_eq!(
            pairs("a=1\nb=2\na=3"),
            vec![kv("a", "3"), kv("b", "2")]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(pairs("a=1\r\nb=2\r\n"), vec![kv("a", "1"), kv("b", "2")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(pairs("").is_empty());
        assert!(pairs("   \n\t\n").is_empty());
    }
}
