// src/core/sanitize.rs

/// Decode the handful of entities that show up in prize tables: named ones
/// used for spacing/currency/punctuation plus any numeric `&#NN;`/`&#xNN;`.
/// Unknown entities are left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let semi = tail[1..].find(';').map(|i| i + 1).filter(|&i| i <= 10);
        let decoded = semi.and_then(|i| decode_one(&tail[1..i]).map(|c| (c, i)));
        match decoded {
            Some((ch, i)) => {
                out.push(ch);
                rest = &tail[i + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_one(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "nbsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "dollar" => '$',
        "cent" => '¢',
        "pound" => '£',
        "euro" => '€',
        "ndash" => '–',
        "mdash" => '—',
        "times" => '×',
        _ => return None,
    };
    Some(ch)
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Lowercase + whitespace-collapse, for comparing column labels.
pub fn label_key(s: &str) -> String {
    normalize_ws(&decode_entities(s)).to_lowercase()
}

/// Drop trailing footnote markers like `*`, `†` or `[1]`.
pub fn strip_footnotes(s: &str) -> &str {
    let mut t = s.trim_end();
    loop {
        let before = t;
        t = t.trim_end_matches(['*', '†', '‡']).trim_end();
        if t.ends_with(']') {
            if let Some(open) = t.rfind('[') {
                if t[open + 1..t.len() - 1].chars().all(|c| c.is_ascii_digit()) {
                    t = t[..open].trim_end();
                }
            }
        }
        if t == before {
            return t;
        }
    }
}
