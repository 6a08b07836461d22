//! The raw/displayed character substitution table.
//!
//! A fixed map substitutes special punctuation characters, once they have
//! been escaped with `\` or typed inside `|...|`, into control-range code
//! points so the runparser does not treat them as operators or grouping
//! when it later re-tokenizes a word. Rendering reverses the substitution.

/// `(raw_control_code, displayed_char)` pairs, taken directly from
/// §4.1's character encoding table.
const RAW_TO_DISPLAY: &[(u8, char)] = &[
    (2, ':'),
    (3, ' '),
    (4, '\t'),
    (5, '\n'),
    (6, '('),
    (11, '?'),
    (14, '+'),
    (15, '~'),
    (16, ')'),
    (17, '['),
    (18, ']'),
    (19, '-'),
    (20, '*'),
    (21, '/'),
    (22, '='),
    (23, '<'),
    (24, '>'),
    (25, '"'),
    (26, '\\'),
    (28, ';'),
    (29, '|'),
    (30, '{'),
    (31, '}'),
];

/// Convert a raw control-range character back to its displayed form. Returns
/// the input unchanged if it is not in the table.
pub fn raw_to_display(c: char) -> char {
    for &(raw, display) in RAW_TO_DISPLAY {
        if c as u32 == raw as u32 {
            return display;
        }
    }
    c
}

/// Convert a displayed character into its raw control-range encoding, if the
/// character has one. Returns `None` for ordinary characters that need no
/// escaping.
pub fn display_to_raw(c: char) -> Option<char> {
    for &(raw, display) in RAW_TO_DISPLAY {
        if display == c {
            return Some(raw as u8 as char);
        }
    }
    None
}

/// Does this character have a raw-encoded form (i.e. would need a leading
/// `\` to be typed literally outside of `|...|`)?
pub fn has_raw_form(c: char) -> bool {
    display_to_raw(c).is_some()
}

/// Apply [`raw_to_display`] across an entire string.
pub fn raw_to_display_string(s: &str) -> String {
    s.chars().map(raw_to_display).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bracket() {
        let raw = display_to_raw('[').unwrap();
        assert_eq!(raw_to_display(raw), '[');
    }

    #[test]
    fn ordinary_char_has_no_raw_form() {
        assert_eq!(display_to_raw('a'), None);
        assert!(!has_raw_form('a'));
    }
}
