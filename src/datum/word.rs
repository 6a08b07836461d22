//! The Word variant of the Datum value model.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::charmap;

/// What a Word was originally constructed from. Controls which side of the
/// lazy raw/numeric conversion is already known at construction time.
#[derive(Clone, Debug)]
enum Origin {
    Number(f64),
    Text(String),
}

struct WordInner {
    origin: Origin,

    /// Set for `|...|`-quoted words; such words never re-tokenize in the
    /// runparser regardless of their contents.
    forever_special: bool,

    /// Raw string form (escape characters preserved in their control-range
    /// encoding). Computed eagerly for text-origin words, lazily for
    /// number-origin words.
    raw: RefCell<Option<String>>,

    /// Printable string form, with raw-to-char substitution applied.
    printable: RefCell<Option<String>>,

    /// Case-folded (ASCII upper-case) lookup key, used by the dictionary and
    /// variable frames.
    key: RefCell<Option<String>>,

    /// Lazily computed numeric value for a text-origin word. `None` means
    /// "not yet attempted"; `Some(None)` means "attempted and failed".
    numeric: RefCell<Option<Option<f64>>>,
}

/// An atomic Logo value: a string or a number, sharing semantics by
/// reference count. Cloning a `Word` clones the handle, not the data.
#[derive(Clone)]
pub struct Word(Rc<WordInner>);

impl Word {
    /// Build a Word from an already-numeric value (e.g. the result of
    /// arithmetic). Its printable/raw forms are produced from the number the
    /// first time they're demanded.
    pub fn from_number(n: f64) -> Word {
        Word(Rc::new(WordInner {
                    origin: Origin::Number(n),
                    forever_special: false,
                    raw: RefCell::new(None),
                    printable: RefCell::new(None),
                    key: RefCell::new(None),
                    numeric: RefCell::new(Some(Some(n))),
                }))
    }

    /// Build a Word from literal text. `raw` is the text exactly as typed
    /// (escape characters already folded to their control-range encoding by
    /// the reader); the printable form is derived immediately.
    pub fn from_raw_text(raw: String, forever_special: bool) -> Word {
        let printable = charmap::raw_to_display_string(&raw);

        Word(Rc::new(WordInner {
                    origin: Origin::Text(raw.clone()),
                    forever_special,
                    raw: RefCell::new(Some(raw)),
                    printable: RefCell::new(Some(printable)),
                    key: RefCell::new(None),
                    numeric: RefCell::new(None),
                }))
    }

    /// Convenience constructor for words built internally by primitives from
    /// plain Rust strings with no raw escapes to fold.
    pub fn from_str(s: &str) -> Word {
        Word::from_raw_text(s.to_string(), false)
    }

    pub fn is_forever_special(&self) -> bool {
        self.0.forever_special
    }

    pub fn is_number_origin(&self) -> bool {
        matches!(self.0.origin, Origin::Number(_))
    }

    /// The raw string form, computing it from the numeric origin the first
    /// time it is needed.
    pub fn raw(&self) -> String {
        if let Some(cached) = self.0.raw.borrow().as_ref() {
            return cached.clone();
        }

        let computed = match self.0.origin {
            Origin::Number(n) => format_number(n),
            Origin::Text(ref s) => s.clone(),
        };

        *self.0.raw.borrow_mut() = Some(computed.clone());
        computed
    }

    /// The printable string form (raw-to-char substitution applied).
    pub fn printable(&self) -> String {
        if let Some(cached) = self.0.printable.borrow().as_ref() {
            return cached.clone();
        }

        let computed = charmap::raw_to_display_string(&self.raw());
        *self.0.printable.borrow_mut() = Some(computed.clone());
        computed
    }

    /// The ASCII upper-case key form used for dictionary/variable lookup.
    pub fn key(&self) -> String {
        if let Some(cached) = self.0.key.borrow().as_ref() {
            return cached.clone();
        }

        let computed = ascii_upper(&self.printable());
        *self.0.key.borrow_mut() = Some(computed.clone());
        computed
    }

    /// Attempt (and cache) numeric conversion. Always succeeds immediately
    /// for number-origin words.
    pub fn numeric_value(&self) -> Option<f64> {
        if let Some(cached) = *self.0.numeric.borrow() {
            return cached;
        }

        let parsed = parse_logo_number(&self.printable());
        *self.0.numeric.borrow_mut() = Some(parsed);
        parsed
    }

    pub fn did_number_conversion_succeed(&self) -> bool {
        self.numeric_value().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    pub fn len(&self) -> usize {
        self.printable().chars().count()
    }

    /// Structural equality per : number-to-number compare when
    /// either side is number-sourced and numeric; otherwise string compare,
    /// case-folded when `ignore_case` is set.
    pub fn equals(&self, other: &Word, ignore_case: bool) -> bool {
        let either_numeric = (self.is_number_origin() && self.numeric_value().is_some())
        || (other.is_number_origin() && other.numeric_value().is_some());

        if either_numeric {
            if let (Some(a), Some(b)) = (self.numeric_value(), other.numeric_value()) {
                return a == b;
            }
        }

        if ignore_case {
            self.key() == other.key()
        } else {
            self.printable() == other.printable()
        }
    }

    pub fn is_identical(&self, other: &Word) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Render the word per rendering rules.
    pub fn print_value(&self, full: bool, depth_limit: i64, width_limit: i64) -> String {
        if depth_limit == 0 {
            return "...".to_string();
        }

        if self.is_number_origin() {
            return self.raw();
        }

        let printable = self.printable();

        if full {
            let needs_bars = self.raw().chars().any(|c| (c as u32) < 0x20);

            if needs_bars {
                let mut out = String::from("|");
                out.push_str(&charmap::raw_to_display_string(&self.raw()));
                out.push('|');
                return out;
            }

            let mut out = String::new();
            for c in printable.chars() {
                if charmap::has_raw_form(c) || c.is_whitespace() {
                    out.push('\\');
                }
                out.push(c);
            }
            return out;
        }

        if width_limit >= 0 {
            let limit = width_limit.max(10) as usize;
            let count = printable.chars().count();
            if count > limit {
                let truncated: String = printable.chars().take(limit).collect();
                return format!("{}...", truncated);
            }
        }

        printable
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Word({:?})", self.printable())
    }
}

/// Format a number the way Logo expects: integral floats print without a
/// trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn ascii_upper(s: &str) -> String {
    s.chars()
    .map(|c| if c.is_ascii() { c.to_ascii_uppercase() } else { c })
    .collect()
}

/// Parse a string the way a Word's numeric form is parsed: plain decimal
/// integer/float syntax, no Logo-specific operator prefixes (those are
/// handled earlier by the runparser).
pub fn parse_logo_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_origin_lazily_produces_string() {
        let w = Word::from_number(12.0);
        assert_eq!(w.raw(), "12");
        assert_eq!(w.printable(), "12");
    }

    #[test]
    fn text_origin_lazily_produces_number() {
        let w = Word::from_str("42");
        assert_eq!(w.numeric_value(), Some(42.0));
        assert!(w.did_number_conversion_succeed());

        let not_num = Word::from_str("hello");
        assert_eq!(not_num.numeric_value(), None);
    }

    #[test]
    fn equals_is_case_insensitive_when_asked() {
        let a = Word::from_str("Hello");
        let b = Word::from_str("HELLO");
        assert!(!a.equals(&b, false));
        assert!(a.equals(&b, true));
    }

    #[test]
    fn equals_numeric_compares_values() {
        let a = Word::from_number(3.0);
        let b = Word::from_str("3");
        assert!(a.equals(&b, false));
    }
}
