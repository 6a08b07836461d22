//! The reader (C2): turns raw source text into a stream of words and
//! bracket/brace delimiters, honoring `\X` escapes, `|...|` grouping,
//! `;` comments, and `~`-terminated line continuation.
//!
//! Built around a forward-only character cursor that tracks its own
//! line/column, paired with a free-standing lexer function that consumes it.

use std::cell::Cell;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::io::{self, BufRead, Write};

use crate::datum::{Array, Datum, List, Word};
use crate::error::{self, ErrorCode, LogoError};

/// The location in the source text where a token was found. Carried by
/// every error so diagnostics can point back at the offending line.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// The file path, or a tag like `<repl>`/`<prompt>` for non-file input.
    path: String,
    line: usize,
    column: usize,
}

impl Hash for SourceLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.line.hash(state);
        self.column.hash(state);
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({}, {})", self.path, self.line, self.column)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLocation {
    pub fn new() -> SourceLocation {
        SourceLocation {
            path: "unspecified".to_string(),
            line: 1,
            column: 1,
        }
    }

    pub fn new_from_path(path: &str) -> SourceLocation {
        SourceLocation {
            path: path.to_owned(),
            line: 1,
            column: 1,
        }
    }

    pub fn new_from_info(path: &str, line: usize, column: usize) -> SourceLocation {
        SourceLocation { path: path.to_owned(), line, column }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

/// Helper to capture the Rust-level call site, used when diagnosing faults
/// that originate in the interpreter itself rather than in user source.
#[macro_export]
macro_rules! location_here {
    () => {
        $crate::reader::SourceLocation::new_from_info(file!(), line!() as usize, column!() as usize)
    };
}

/// A forward-only cursor over one line of Logo source text.
struct LineBuffer<'a> {
    chars: std::str::Chars<'a>,
    location: SourceLocation,
    current: Option<char>,
}

impl<'a> LineBuffer<'a> {
    fn new(path: &str, line_number: usize, text: &'a str) -> LineBuffer<'a> {
        LineBuffer {
            chars: text.chars(),
            location: SourceLocation::new_from_info(path, line_number, 1),
            current: None,
        }
    }

    fn location(&self) -> SourceLocation {
        self.location.clone()
    }

    fn peek(&mut self) -> Option<char> {
        if self.current.is_none() {
            self.current = self.chars.next();
        }
        self.current
    }

    fn advance(&mut self) -> Option<char> {
        let next = match self.current.take() {
            Some(c) => Some(c),
            None => self.chars.next(),
        };

        if let Some(c) = next {
            self.location.column += 1;
            if c == '\n' {
                self.location.line += 1;
                self.location.column = 1;
            }
        }

        next
    }
}

/// One lexical unit produced by the reader, before runparse decomposition
/// (C3) splits operator punctuation out of bare words.
#[derive(Clone, Debug)]
pub enum RawToken {
    /// A bare or `|...|`-quoted word. `forever_special` mirrors
    /// [`Word::is_forever_special`]: such words skip runparse entirely.
    Word { raw: String, forever_special: bool },
    OpenSquare,
    CloseSquare,
    OpenBrace,
    CloseBrace,
}

/// Lex a single line of text into raw tokens, appending to `out`. Returns an
/// error only for unterminated `|...|` groups (which the caller resolves by
/// asking for a continuation line, per `read_list_with_prompt`).
fn lex_line(path: &str, line_number: usize, text: &str, out: &mut Vec<RawToken>) -> error::Result<()> {
    let mut buf = LineBuffer::new(path, line_number, text);

    loop {
        let Some(c) = buf.peek() else { break };

        if c.is_whitespace() {
            buf.advance();
            continue;
        }

        if c == ';' {
            // Comment runs to end of line, unless escaped with `\`.
            break;
        }

        if c == '[' {
            buf.advance();
            out.push(RawToken::OpenSquare);
            continue;
        }
        if c == ']' {
            buf.advance();
            out.push(RawToken::CloseSquare);
            continue;
        }
        if c == '{' {
            buf.advance();
            out.push(RawToken::OpenBrace);
            continue;
        }
        if c == '}' {
            buf.advance();
            out.push(RawToken::CloseBrace);
            continue;
        }

        if c == '|' {
            let location = buf.location();
            buf.advance();
            let mut raw = String::new();
            loop {
                match buf.advance() {
                    Some('|') => break,
                    // Inside |...|, only `\|` is interpreted (as a literal
                    // bar that doesn't close the group); any other `\` is
                    // itself an ordinary character, not an escape introducer.
                    Some('\\') if buf.peek() == Some('|') => {
                        buf.advance();
                        raw.push(encode_escaped('|'));
                    }
                    Some(other) => raw.push(encode_literal_space(other)),
                    None => {
                        return LogoError::new_as_result(
                            ErrorCode::Internal,
                            Some(location),
                            "unterminated | group".to_string(),
                        );
                    }
                }
            }
            out.push(RawToken::Word { raw, forever_special: true });
            continue;
        }

        // A bare word: runs until whitespace, a bracket/brace, or an
        // unescaped comment marker.
        let mut raw = String::new();
        loop {
            match buf.peek() {
                None => break,
                Some(w) if w.is_whitespace() => break,
                Some('[') | Some(']') | Some('{') | Some('}') => break,
                Some(';') => break,
                Some('\\') => {
                    buf.advance();
                    if let Some(escaped) = buf.advance() {
                        raw.push(encode_escaped(escaped));
                    }
                }
                Some(other) => {
                    buf.advance();
                    raw.push(other);
                }
            }
        }
        out.push(RawToken::Word { raw, forever_special: false });
    }

    Ok(())
}

/// Fold an escaped (or `|...|`-quoted) character into its raw control-range
/// encoding, so the runparser never mistakes it for an operator. Characters
/// with no entry in the table pass through unchanged.
fn encode_escaped(c: char) -> char {
    crate::datum::charmap::display_to_raw(c).unwrap_or(c)
}

/// Inside `|...|`, a literal space must still read back as a space on
/// display, but must not be treated as a token separator if the quoted word
/// is later re-examined raw; encoding it keeps the word lexically atomic.
fn encode_literal_space(c: char) -> char {
    if c == ' ' {
        crate::datum::charmap::display_to_raw(' ').unwrap_or(' ')
    } else {
        c
    }
}

/// Does this line, stripped of a trailing comment, end with a `~`
/// continuation marker?
fn ends_with_continuation(text: &str) -> bool {
    let without_comment = match text.find(';') {
        Some(idx) => &text[..idx],
        None => text,
    };
    without_comment.trim_end().ends_with('~')
}

/// Abstracts over where the reader's lines come from: an interactive
/// terminal (prompted line by line) or a script file/string (already split
/// into lines, no prompting).
pub trait LineSource {
    /// Returns `Ok(None)` at end of input.
    fn next_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
    fn path(&self) -> &str;
}

/// Reads lines from stdin, printing `prompt` first when input is a terminal.
pub struct StdinLineSource {
    path: String,
    interactive: bool,
}

impl StdinLineSource {
    pub fn new(interactive: bool) -> StdinLineSource {
        StdinLineSource { path: "<stdin>".to_string(), interactive }
    }
}

impl LineSource for StdinLineSource {
    fn next_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if self.interactive {
            print!("{}", prompt);
            io::stdout().flush()?;
        }

        let mut line = String::new();
        let bytes = io::stdin().lock().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Reads lines out of a fixed, already-loaded script (a file's full text, or
/// a procedure body being re-read for editing).
pub struct StringLineSource {
    path: String,
    lines: Vec<String>,
    next_index: usize,
}

impl StringLineSource {
    pub fn new(path: &str, text: &str) -> StringLineSource {
        StringLineSource {
            path: path.to_string(),
            lines: text.lines().map(|s| s.to_string()).collect(),
            next_index: 0,
        }
    }
}

impl LineSource for StringLineSource {
    fn next_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        if self.next_index >= self.lines.len() {
            return Ok(None);
        }
        let line = self.lines[self.next_index].clone();
        self.next_index += 1;
        Ok(Some(line))
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Drives [`LineSource`] to assemble multi-line bracketed input, per the
/// structure-building "Reading" operations.
pub struct Reader<'a> {
    source: &'a mut dyn LineSource,
    line_number: Cell<usize>,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a mut dyn LineSource) -> Reader<'a> {
        Reader { source, line_number: Cell::new(1) }
    }

    fn read_physical_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let line = self.source.next_line(prompt)?;
        if line.is_some() {
            self.line_number.set(self.line_number.get() + 1);
        }
        Ok(line)
    }

    /// `READWORD`/`RAWASCII`-style raw line read: a whole line (after
    /// following `~` continuations) as a single atomic Word, never
    /// tokenized.
    pub fn read_raw_line_with_prompt(&mut self, prompt: &str) -> error::Result<Option<Word>> {
        let mut assembled = String::new();

        loop {
            let line = match self.read_physical_line(prompt)? {
                Some(l) => l,
                None => {
                    if assembled.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
            };

            let continues = ends_with_continuation(&line);
            let trimmed = if continues {
                let t = line.trim_end();
                &t[..t.len() - 1]
            } else {
                line.as_str()
            };

            if !assembled.is_empty() {
                assembled.push('\n');
            }
            assembled.push_str(trimmed);

            if !continues {
                break;
            }
        }

        Ok(Some(Word::from_raw_text(assembled, false)))
    }

    /// `READWORD`'s tokenized sibling used internally by the parser: read
    /// one logical (continuation-joined) line and lex it into raw tokens.
    fn read_raw_tokens(&mut self, prompt: &str) -> error::Result<Option<Vec<RawToken>>> {
        let mut tokens = Vec::new();
        let mut any_line = false;

        loop {
            let line = match self.read_physical_line(prompt)? {
                Some(l) => l,
                None => break,
            };
            any_line = true;

            let continues = ends_with_continuation(&line);
            let trimmed = if continues {
                let t = line.trim_end();
                &t[..t.len() - 1]
            } else {
                line.as_str()
            };

            lex_line(self.source.path(), self.line_number.get(), trimmed, &mut tokens)?;

            if !continues {
                break;
            }
        }

        if !any_line && tokens.is_empty() {
            return Ok(None);
        }

        Ok(Some(tokens))
    }

    /// `READLIST`: read one logical line, lexed into tokens, and build the
    /// top-level List it denotes (no enclosing brackets expected — the
    /// entire line is the list body). If a `[`/`{` is left unclosed, keep
    /// prompting for continuation lines until the nesting balances.
    pub fn read_list_with_prompt(&mut self, prompt: &str) -> error::Result<Option<List>> {
        let mut tokens = match self.read_raw_tokens(prompt)? {
            Some(t) => t,
            None => return Ok(None),
        };

        while unbalanced_depth(&tokens) > 0 {
            let more = self.read_raw_tokens("? ")?;
            match more {
                Some(extra) => tokens.extend(extra),
                None => break,
            }
        }

        let mut cursor = tokens.into_iter().peekable();
        let items = build_items_until(&mut cursor, None)?;
        Ok(Some(List::from_vec(items)))
    }

    /// Read one logical line and return only its first token as a value,
    /// discarding the rest. Used by parser/evaluator call sites that want a
    /// single tokenized value rather than a full list (distinct from the
    /// `READWORD` primitive, which reads the whole line as one atomic Word
    /// via [`Reader::read_raw_line_with_prompt`]).
    pub fn read_word_with_prompt(&mut self, prompt: &str) -> error::Result<Option<Datum>> {
        let tokens = match self.read_raw_tokens(prompt)? {
            Some(t) => t,
            None => return Ok(None),
        };
        let mut cursor = tokens.into_iter().peekable();
        let items = build_items_until(&mut cursor, None)?;
        Ok(items.into_iter().next())
    }
}

fn unbalanced_depth(tokens: &[RawToken]) -> i64 {
    let mut depth = 0i64;
    for t in tokens {
        match t {
            RawToken::OpenSquare | RawToken::OpenBrace => depth += 1,
            RawToken::CloseSquare | RawToken::CloseBrace => depth -= 1,
            RawToken::Word { .. } => {}
        }
    }
    depth
}

/// Recursive-descent assembly of nested List/Array literals from a flat
/// token stream. `closing` is `Some(true)` for a recursive call started just
/// after `[`, `Some(false)` for one started just after `{`, `None` at the
/// top level.
fn build_items_until(
    cursor: &mut std::iter::Peekable<std::vec::IntoIter<RawToken>>,
    closing: Option<bool>,
) -> error::Result<Vec<Datum>> {
    let mut items = Vec::new();

    loop {
        match cursor.next() {
            None => {
                if closing.is_some() {
                    return LogoError::new_as_result(
                        ErrorCode::ParenNotFound,
                        None,
                        "list not closed before end of input".to_string(),
                    );
                }
                break;
            }
            Some(RawToken::CloseSquare) => {
                if closing == Some(true) {
                    break;
                }
                return LogoError::new_as_result(
                    ErrorCode::UnexpectedSquare,
                    None,
                    "unexpected ]".to_string(),
                );
            }
            Some(RawToken::CloseBrace) => {
                if closing == Some(false) {
                    break;
                }
                return LogoError::new_as_result(
                    ErrorCode::UnexpectedBrace,
                    None,
                    "unexpected }".to_string(),
                );
            }
            Some(RawToken::OpenSquare) => {
                let inner = build_items_until(cursor, Some(true))?;
                items.push(Datum::List(List::from_vec(inner)));
            }
            Some(RawToken::OpenBrace) => {
                let inner = build_items_until(cursor, Some(false))?;
                items.push(Datum::Array(Array::new(inner, 1)));
            }
            Some(RawToken::Word { raw, forever_special }) => {
                items.push(Datum::Word(Word::from_raw_text(raw, forever_special)));
            }
        }
    }

    Ok(items)
}

/// Read a single raw character (`READCHAR`), bypassing line buffering
/// entirely. Returns `None` at end of input.
pub fn read_char(input: &mut dyn io::Read) -> io::Result<Option<char>> {
    let mut byte = [0u8; 1];
    let n = input.read(&mut byte)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(byte[0] as char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_brackets_and_words() {
        let mut tokens = Vec::new();
        lex_line("<test>", 1, "fd 100 [ rt 90 ]", &mut tokens).unwrap();
        assert_eq!(tokens.len(), 5);
        assert!(matches!(tokens[2], RawToken::OpenSquare));
        assert!(matches!(tokens[4], RawToken::CloseSquare));
    }

    #[test]
    fn comment_is_stripped() {
        let mut tokens = Vec::new();
        lex_line("<test>", 1, "fd 100 ; go forward", &mut tokens).unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn bar_quoted_word_keeps_spaces() {
        let mut tokens = Vec::new();
        lex_line("<test>", 1, "|hello world|", &mut tokens).unwrap();
        assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            RawToken::Word { forever_special, .. } => assert!(*forever_special),
            _ => panic!("expected word"),
        }
    }

    #[test]
    fn continuation_marker_detected() {
        assert!(ends_with_continuation("make \"x 5 ~"));
        assert!(!ends_with_continuation("make \"x 5"));
    }

    #[test]
    fn builds_nested_list_structure() {
        let mut source = StringLineSource::new("<test>", "[ 1 2 [ 3 4 ] ]");
        let mut reader = Reader::new(&mut source);
        let list = reader.read_list_with_prompt("? ").unwrap().unwrap();
        assert_eq!(list.len(), 1);
        let outer = list.first().unwrap();
        let outer_list = outer.as_list().unwrap();
        assert_eq!(outer_list.len(), 3);
    }
}
