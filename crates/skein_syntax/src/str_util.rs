/// Strips the surrounding quotes of a string literal and decodes its escapes.
pub fn unquote(s: &str) -> String {
    let bytes = s.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        unescape(&s[1..bytes.len() - 1])
    } else {
        s.to_string()
    }
}

pub fn unescape(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            res.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => res.push('\n'),
            Some('r') => res.push('\r'),
            Some('t') => res.push('\t'),
            Some('b') => res.push('\u{8}'),
            Some('f') => res.push('\u{c}'),
            Some('v') => res.push('\u{b}'),
            Some('0') if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => res.push('\0'),
            Some('x') => {
                let code = take_hex(&mut chars, 2);
                push_code(&mut res, code, "\\x");
            }
            Some('u') => {
                let code = if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut v = 0u32;
                    for d in chars.by_ref() {
                        if d == '}' {
                            break;
                        }
                        v = v.saturating_mul(16).saturating_add(d.to_digit(16).unwrap_or(0));
                    }
                    Some(v)
                } else {
                    take_hex(&mut chars, 4)
                };
                push_code(&mut res, code, "\\u");
            }
            // Line continuation.
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(other) => res.push(other),
            None => res.push('\\'),
        }
    }
    res
}

fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, n: usize) -> Option<u32> {
    let mut v = 0u32;
    for _ in 0..n {
        let d = chars.peek()?.to_digit(16)?;
        chars.next();
        v = v * 16 + d;
    }
    Some(v)
}

fn push_code(res: &mut String, code: Option<u32>, prefix: &str) {
    match code.and_then(char::from_u32) {
        Some(ch) => res.push(ch),
        // Lone surrogates have no UTF-8 form.
        None if code.is_some() => res.push('\u{FFFD}'),
        None => res.push_str(prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_common_escapes() {
        assert_eq!(unquote("'a\\nb'"), "a\nb");
        assert_eq!(unquote("\"\\x41\\u0042\\u{43}\""), "ABC");
        assert_eq!(unquote("'it\\'s'"), "it's");
        assert_eq!(unquote("\"\\0\""), "\0");
    }

    #[test]
    fn keeps_unterminated_text() {
        assert_eq!(unquote("\"abc"), "\"abc");
    }
}
