//! Reduction of HTML-bearing text to plain text.

/// Strip tags, decode entities and collapse whitespace.
///
/// Every tag acts as a word boundary, so `<b>Hi</b>there` yields `Hi there`. A `<` that does
/// not open a tag (`a < b`) is kept as text.
#[must_use]
pub fn clean_markup(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('<') {
        let (before, tail) = rest.split_at(pos);
        text.push_str(before);

        if let Some(len) = tag_len(tail) {
            text.push(' ');
            rest = tail.get(len..).unwrap_or_default();
        } else {
            text.push('<');
            rest = tail.get(1..).unwrap_or_default();
        }
    }
    text.push_str(rest);

    normalize_ws(&decode_entities(&text))
}

/// Length of the tag or comment at the start of `tail`, if it opens one.
fn tag_len(tail: &str) -> Option<usize> {
    if tail.starts_with("<!--") {
        return Some(tail.find("-->").map_or(tail.len(), |end| end + 3));
    }

    let opener = tail.chars().nth(1)?;
    if !(opener.is_ascii_alphabetic() || opener == '/' || opener == '!') {
        return None;
    }

    tail.find('>').map(|end| end + 1)
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);

        match decode_entity(tail) {
            Some((ch, len)) => {
                out.push(ch);
                rest = tail.get(len..).unwrap_or_default();
            }
            None => {
                out.push('&');
                rest = tail.get(1..).unwrap_or_default();
            }
        }
    }
    out.push_str(rest);

    out
}

/// Decode the entity at the start of `tail`, returning the character and the entity length.
fn decode_entity(tail: &str) -> Option<(char, usize)> {
    // longest entity handled is `&#x10FFFF;`
    let end = tail.char_indices().take(12).find(|&(_, c)| c == ';').map(|(i, _)| i)?;
    let name = tail.get(1..end)?;

    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let numeric = name.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };

    Some((ch, end + 1))
}

fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;

    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }

    if out.ends_with(' ') {
        let _ = out.pop();
    }

    out
}
