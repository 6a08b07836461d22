//! The Datum value model (C1,, §4.1).
//!
//! `Datum` is the closed variant every Logo value belongs to. Aggregates
//! (`List`, `Array`) and `Word` share their payload by reference count so
//! that mutation through one alias (`.SETFIRST`, `.SETITEM`, …) is visible
//! through every other alias — matching ordering guarantee.

pub mod array;
pub mod ast;
pub mod charmap;
pub mod error_value;
pub mod list;
pub mod procedure;
pub mod word;

pub use array::Array;
pub use ast::AstNode;
pub use error_value::ErrorDatum;
pub use list::List;
pub use procedure::{ProcedureDef, ProcedureRef};
pub use word::Word;

use std::rc::Rc;

/// The discriminated value domain described in.
#[derive(Clone)]
pub enum Datum {
    /// The sole sentinel for "no result", distinct from an empty List or an
    /// empty Word.
    NoValue,
    Word(Word),
    List(List),
    Array(Array),
    Ast(Rc<AstNode>),
    Procedure(ProcedureRef),
    Error(Rc<ErrorDatum>),
}

impl Datum {
    pub fn word(s: &str) -> Datum {
        Datum::Word(Word::from_str(s))
    }

    pub fn number(n: f64) -> Datum {
        Datum::Word(Word::from_number(n))
    }

    pub fn list(items: Vec<Datum>) -> Datum {
        Datum::List(List::from_vec(items))
    }

    pub fn kind(&self) -> &'static str {
    match self {
        Datum::NoValue => "novalue",
        Datum::Word(_) => "word",
        Datum::List(_) => "list",
        Datum::Array(_) => "array",
        Datum::Ast(_) => "ast",
        Datum::Procedure(_) => "procedure",
        Datum::Error(_) => "error",
    }
}

pub fn is_no_value(&self) -> bool {
    matches!(self, Datum::NoValue)
}

pub fn is_word(&self) -> bool {
    matches!(self, Datum::Word(_))
}

pub fn is_list(&self) -> bool {
    matches!(self, Datum::List(_))
}

pub fn is_array(&self) -> bool {
    matches!(self, Datum::Array(_))
}

pub fn is_number(&self) -> bool {
    match self {
        Datum::Word(w) => w.numeric_value().is_some(),
        _ => false,
    }
}

pub fn as_word(&self) -> Option<&Word> {
    match self {
        Datum::Word(w) => Some(w),
        _ => None,
    }
}

pub fn as_list(&self) -> Option<&List> {
    match self {
        Datum::List(l) => Some(l),
        _ => None,
    }
}

pub fn as_array(&self) -> Option<&Array> {
    match self {
        Datum::Array(a) => Some(a),
        _ => None,
    }
}

pub fn as_procedure(&self) -> Option<&ProcedureRef> {
    match self {
        Datum::Procedure(p) => Some(p),
        _ => None,
    }
}

/// `.EQ?` — reference identity. Words/Lists/Arrays compare their shared
/// backing cell; everything else falls back to a kind+value comparison
/// since those variants have no independent identity worth preserving.
pub fn is_identical(&self, other: &Datum) -> bool {
    match (self, other) {
        (Datum::NoValue, Datum::NoValue) => true,
        (Datum::Word(a), Datum::Word(b)) => a.is_identical(b),
        (Datum::List(a), Datum::List(b)) => a.is_identical(b),
        (Datum::Array(a), Datum::Array(b)) => a.is_identical(b),
        (Datum::Ast(a), Datum::Ast(b)) => Rc::ptr_eq(a, b),
        (Datum::Procedure(a), Datum::Procedure(b)) => Rc::ptr_eq(a, b),
        (Datum::Error(a), Datum::Error(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// `EQUAL?` — structural equality. NoValue never equals anything,
/// including another NoValue, matching "NoValue ≠ empty List ≠ empty
/// Word" ; in practice the evaluator never exposes NoValue
/// to user comparisons, but the rule is honored here for completeness.
pub fn equals(&self, other: &Datum, ignore_case: bool) -> bool {
    match (self, other) {
        (Datum::NoValue, _) | (_, Datum::NoValue) => false,
        (Datum::Word(a), Datum::Word(b)) => a.equals(b, ignore_case),
        (Datum::List(a), Datum::List(b)) => a.equals(b, ignore_case),
        (Datum::Array(a), Datum::Array(b)) => a.equals(b, ignore_case),
        (Datum::Procedure(a), Datum::Procedure(b)) => Rc::ptr_eq(a, b),
        (Datum::Ast(a), Datum::Ast(b)) => Rc::ptr_eq(a, b),
        (Datum::Error(a), Datum::Error(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

pub fn size(&self) -> usize {
    match self {
        Datum::Word(w) => w.len(),
        Datum::List(l) => l.len(),
        Datum::Array(a) => a.len(),
        _ => 0,
    }
}

pub fn first(&self) -> Option<Datum> {
    match self {
        Datum::Word(w) => {
            let printable = w.printable();
            printable
            .chars()
            .next()
            .map(|c| Datum::word(&c.to_string()))
        }
        Datum::List(l) => l.first(),
        Datum::Array(a) => a.item_at(a.origin()),
        _ => None,
    }
}

pub fn last(&self) -> Option<Datum> {
    match self {
        Datum::Word(w) => {
            let printable = w.printable();
            printable
            .chars()
            .last()
            .map(|c| Datum::word(&c.to_string()))
        }
        Datum::List(l) => {
            let items = l.to_vec();
            items.last().cloned()
        }
        Datum::Array(a) => {
            if a.is_empty() {
                None
            } else {
                a.item_at(a.origin() + a.len() as i64 - 1)
            }
        }
        _ => None,
    }
}

pub fn butfirst(&self) -> Option<Datum> {
    match self {
        Datum::Word(w) => {
            let printable = w.printable();
            let mut chars = printable.chars();
            chars.next()?;
            Some(Datum::word(&chars.as_str().to_string()))
        }
        Datum::List(l) => {
            if l.is_empty() {
                None
            } else {
                Some(Datum::List(l.rest()))
            }
        }
        _ => None,
    }
}

pub fn butlast(&self) -> Option<Datum> {
    match self {
        Datum::Word(w) => {
            let printable = w.printable();
            let mut chars: Vec<char> = printable.chars().collect();
            if chars.is_empty() {
                return None;
            }
            chars.pop();
            Some(Datum::word(&chars.into_iter().collect::<String>()))
        }
        Datum::List(l) => {
            if l.is_empty() {
                return None;
            }
            let mut items = l.to_vec();
            items.pop();
            Some(Datum::list(items))
        }
        _ => None,
    }
}

/// 1-based indexed access, honoring an Array's configurable origin.
pub fn item_at(&self, index: i64) -> Option<Datum> {
    match self {
        Datum::Word(w) => {
            let printable = w.printable();
            if index < 1 {
                return None;
            }
            printable
            .chars()
            .nth((index - 1) as usize)
            .map(|c| Datum::word(&c.to_string()))
        }
        Datum::List(l) => {
            if index < 1 {
                return None;
            }
            let items = l.to_vec();
            items.get((index - 1) as usize).cloned()
        }
        Datum::Array(a) => a.item_at(index),
        _ => None,
    }
}

pub fn index_in_range(&self, index: i64) -> bool {
    match self {
        Datum::Word(w) => index >= 1 && index <= w.len() as i64,
        Datum::List(l) => index >= 1 && index <= l.len() as i64,
        Datum::Array(a) => a.index_in_range(index),
        _ => false,
    }
}

/// `MEMBER?` — deep membership: true if `needle` occurs anywhere at any
/// nesting depth within this aggregate.
pub fn contains(&self, needle: &Datum, ignore_case: bool) -> bool {
    match self {
        Datum::List(l) => l.to_vec().iter().any(|item| {
                item.equals(needle, ignore_case) || item.contains(needle, ignore_case)
            }),
        Datum::Word(w) => {
            if let Datum::Word(n) = needle {
                w.printable().contains(&n.printable())
            } else {
                false
            }
        }
        _ => false,
    }
}

/// `MEMBERP`'s shallow variant — true if `needle` is a direct element of
/// this aggregate.
pub fn is_member(&self, needle: &Datum, ignore_case: bool) -> bool {
    match self {
        Datum::List(l) => l.to_vec().iter().any(|item| item.equals(needle, ignore_case)),
        Datum::Array(a) => a.to_vec().iter().any(|item| item.equals(needle, ignore_case)),
        Datum::Word(w) => {
            if let Datum::Word(n) = needle {
                w.printable().contains(&n.printable())
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Core renderer shared by `print_value`/`show_value`. `top_level`
/// controls whether a List suppresses its own enclosing brackets.
pub fn render(&self, full: bool, depth_limit: i64, width_limit: i64, top_level: bool) -> String {
    match self {
        Datum::NoValue => String::new(),
        Datum::Word(w) => w.print_value(full, depth_limit, width_limit),
        Datum::List(l) => l.print_value(full, depth_limit, width_limit, top_level),
        Datum::Array(a) => a.print_value(full, depth_limit, width_limit),
        Datum::Ast(_) => "<ast>".to_string(),
        Datum::Procedure(p) => format!("<procedure {}>", p.name),
        Datum::Error(e) => format!("<error {} {}>", e.code, e.message.printable()),
    }
}

/// `PRINT`/`TYPE`-style rendering: never encloses a top-level List in
/// brackets.
pub fn print(&self, full: bool, depth_limit: i64, width_limit: i64) -> String {
    self.render(full, depth_limit, width_limit, true)
}

/// `SHOW`-style rendering: a top-level List is enclosed in brackets.
pub fn show(&self, full: bool, depth_limit: i64, width_limit: i64) -> String {
    self.render(full, depth_limit, width_limit, false)
}
}
