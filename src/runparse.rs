//! RUNPARSE (C3, ): decomposes compound word tokens produced by
//! the reader into the operator/number/name sub-tokens the parser (C4)
//! expects, without ever re-examining an already-List or already-Array item.
//!
//! Operates on a Word's *raw* form, never its printable form: an escaped or
//! `|...|`-quoted punctuation character was already folded into a control
//! code point by the reader, so it is structurally inert here and simply
//! rides along as ordinary name text.

use crate::datum::{Datum, List, Word};

const SINGLE_CHAR_OPERATORS: &[char] = &['+', '*', '/', '=', '(', ')'];

/// RUNPARSE a single source line (a flat List of reader tokens), producing
/// the flat token list the parser consumes. Memoized on the line's own
/// parse-cache slot, keyed by `catalogue_timestamp`.
pub fn runparse(line: &List, catalogue_timestamp: u64) -> List {
    if let Some(cached) = line.cached_runparse(catalogue_timestamp) {
        return cached;
    }

    let mut out = Vec::new();
    for item in line.to_vec() {
        match item {
            Datum::Word(w) => out.extend(runparse_word(&w).into_iter().map(Datum::Word)),
            other => out.push(other),
        }
    }

    let result = List::from_vec(out);
    line.store_runparse_cache(catalogue_timestamp, result.clone());
    result
}

/// Decompose one raw word into its constituent tokens. A `|...|`-quoted
/// (`forever_special`) word never decomposes, matching 's
/// "forever special" guarantee. Numeric-origin words (results of prior
/// arithmetic) likewise pass through whole: they carry no punctuation to
/// split.
pub fn runparse_word(word: &Word) -> Vec<Word> {
    if word.is_forever_special() || word.is_number_origin() {
        return vec![word.clone()];
    }

    let raw = word.raw();
    let chars: Vec<char> = raw.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    // A run of ordinary (non-operator, non-sigil) characters accumulated
    // since the last emitted token; flushed whenever an operator/sigil is
    // encountered or the scan ends.
    let mut run = String::new();

    macro_rules! flush_run {
        () => {
            if !run.is_empty() {
                tokens.push(Word::from_raw_text(std::mem::take(&mut run), false));
            }
        };
    }

    while i < chars.len() {
        let c = chars[i];

        // `:` and `"` are prefix sigils: they bind to the following run of
        // ordinary characters as a single atomic token (a variable
        // reference or a quoted literal), never split from it.
        if c == ':' || c == '"' {
            flush_run!();
            let mut sigil = String::new();
            sigil.push(c);
            i += 1;
            while i < chars.len() && !is_operator_start(chars[i], i) {
                sigil.push(chars[i]);
                i += 1;
            }
            tokens.push(Word::from_raw_text(sigil, false));
            continue;
        }

        // `?` optionally followed by digits names an implicit parameter
        // slot inside a template list; kept as one atomic token.
        if c == '?' {
            flush_run!();
            let mut slot = String::from("?");
            i += 1;
            while i < chars.len() && chars[i].is_ascii_digit() {
                slot.push(chars[i]);
                i += 1;
            }
            tokens.push(Word::from_raw_text(slot, false));
            continue;
        }

        if c == '<' && chars.get(i + 1) == Some(&'=') {
            flush_run!();
            tokens.push(Word::from_raw_text("<=".to_string(), false));
            i += 2;
            continue;
        }
        if c == '>' && chars.get(i + 1) == Some(&'=') {
            flush_run!();
            tokens.push(Word::from_raw_text(">=".to_string(), false));
            i += 2;
            continue;
        }
        if c == '<' && chars.get(i + 1) == Some(&'>') {
            flush_run!();
            tokens.push(Word::from_raw_text("<>".to_string(), false));
            i += 2;
            continue;
        }

        if c == '-' {
            // Unary if it opens the word (or immediately follows an
            // already-emitted operator/paren token with nothing
            // accumulated in `run`): UCBLogo's "space before, no space
            // after" rule collapses to "this token started with `-`" once
            // the reader has already split on whitespace.
            let is_unary = run.is_empty() && tokens.is_empty();
            if is_unary {
                run.push('-');
                i += 1;
                continue;
            }

            flush_run!();
            tokens.push(Word::from_raw_text("-".to_string(), false));
            i += 1;
            continue;
        }

        if SINGLE_CHAR_OPERATORS.contains(&c) {
            flush_run!();
            tokens.push(Word::from_raw_text(c.to_string(), false));
            i += 1;
            continue;
        }

        if c == '<' || c == '>' {
            flush_run!();
            tokens.push(Word::from_raw_text(c.to_string(), false));
            i += 1;
            continue;
        }

        run.push(c);
        i += 1;
    }

    flush_run!();

    if tokens.is_empty() {
        vec![word.clone()]
    } else {
        tokens
    }
}

fn is_operator_start(c: char, position: usize) -> bool {
    let _ = position;
    matches!(c, '+' | '-' | '*' | '/' | '=' | '<' | '>' | '(' | ')' | ':' | '"' | '?')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> List {
        List::from_vec(texts.iter().map(|t| Datum::word(t)).collect())
    }

    fn raws(line: &List) -> Vec<String> {
        line.to_vec()
        .into_iter()
        .map(|d| d.as_word().unwrap().raw())
        .collect()
    }

    #[test]
    fn splits_fused_arithmetic() {
        let line = words(&["3+4"]);
        let result = runparse(&line, 0);
        assert_eq!(raws(&result), vec!["3", "+", "4"]);
    }

    #[test]
    fn leaves_separated_tokens_alone() {
        let line = words(&["3", "+", "4"]);
        let result = runparse(&line, 0);
        assert_eq!(raws(&result), vec!["3", "+", "4"]);
    }

    #[test]
    fn unary_minus_attaches_to_number() {
        let line = words(&["-5"]);
        let result = runparse(&line, 0);
        assert_eq!(raws(&result), vec!["-5"]);
    }

    #[test]
    fn binary_minus_splits() {
        let line = words(&["3-5"]);
        let result = runparse(&line, 0);
        assert_eq!(raws(&result), vec!["3", "-", "5"]);
    }

    #[test]
    fn colon_prefix_stays_atomic() {
        let line = words(&[":X"]);
        let result = runparse(&line, 0);
        assert_eq!(raws(&result), vec![":X"]);
    }

    #[test]
    fn colon_prefix_before_operator() {
        let line = words(&[":X+1"]);
        let result = runparse(&line, 0);
        assert_eq!(raws(&result), vec![":X", "+", "1"]);
    }

    #[test]
    fn list_literal_passes_through_undecomposed() {
        let line = List::from_vec(vec![Datum::List(words(&["1", "+", "2"]))]);
        let result = runparse(&line, 0);
        assert_eq!(result.len(), 1);
        assert!(result.first().unwrap().is_list());
    }

    #[test]
    fn question_mark_slot() {
        let line = words(&["?2"]);
        let result = runparse(&line, 0);
        assert_eq!(raws(&result), vec!["?2"]);
    }

    #[test]
    fn memoizes_against_timestamp() {
        let line = words(&["3+4"]);
        let first = runparse(&line, 5);
        let second = runparse(&line, 5);
        assert!(first.is_identical(&second));
    }
}
