//! The Error variant of the Datum value model.
//!
//! Distinct from [`crate::error::LogoError`]: that type is the Rust-level
//! `Result::Err` payload used to unwind the evaluator; `ErrorDatum` is the
//! Logo-visible *value* produced once an error has been registered, the kind
//! `CATCH "ERROR` captures and binds to `ERROR`.

use super::list::List;
use super::word::Word;
use super::Datum;

pub struct ErrorDatum {
    pub code: i64,
    pub message: Word,
    pub tag: Option<Word>,
    pub output: Option<Datum>,
    /// The name of the procedure that was executing when the error was
    /// registered, if any.
    pub procedure_name: Option<String>,
    /// The instruction line List that was executing when the error was
    /// registered.
    pub line: Option<List>,
}

impl ErrorDatum {
    /// The four-element list `[code message procedure-name offending-line]`
    /// that `CATCH "ERROR` binds to the `ERROR` variable.
    pub fn as_report_list(&self) -> List {
        let procedure_word = self
        .procedure_name
        .as_deref()
        .map(Datum::word)
        .unwrap_or(Datum::List(List::empty()));

        let line_datum = self
        .line
        .clone()
        .map(Datum::List)
        .unwrap_or(Datum::List(List::empty()));

        List::from_vec(vec![
                Datum::Word(Word::from_number(self.code as f64)),
                Datum::Word(self.message.clone()),
                procedure_word,
                line_datum,
            ])
    }
}
