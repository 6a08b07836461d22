//! The native primitive catalogue.
//!
//! Organized as one `register_*`-shaped function per topical group, each
//! adding its primitives to a shared [`crate::catalogue::Catalogue`], all
//! called from [`register_all`]. `prim!` is the one place that builds a
//! [`crate::datum::ast::Primitive`] and hides the `Rc::new(...)` wrapping.

pub mod arithmetic;
pub mod control;
pub mod io;
pub mod predicates;
pub mod turtle;
pub mod words_lists;
pub mod workspace_prims;

use crate::catalogue::Catalogue;
use crate::datum::{Datum, List, Word};
use crate::error::{self, ErrorCode, LogoError};

/// Register a primitive under one or more names (the first is canonical;
/// any further names are aliases sharing the same handler), mirroring
/// ("Aliases (e.g. `FD` for `FORWARD`) are additional entries
/// with the same handler").
macro_rules! prim {
    ($cat:expr, [$($name:expr),+ $(,)?], $min:expr, $default:expr, $max:expr, $handler:expr) => {{
            let handler: std::rc::Rc<dyn Fn(&mut crate::interpreter::Interpreter, &crate::datum::ast::AstNode) -> crate::error::Result<crate::evaluator::StepResult>> = std::rc::Rc::new($handler);
            $(
                $cat.register_primitive(crate::datum::ast::Primitive {
                        name: $name.to_string(),
                        min_args: $min,
                        default_args: $default,
                        max_args: $max,
                        handler: handler.clone(),
                    });
            )+
        }};
    ($cat:expr, $name:expr, $min:expr, $default:expr, $max:expr, $handler:expr) => {
        prim!($cat, [$name], $min, $default, $max, $handler)
    };
}
pub(crate) use prim;

pub fn register_all(cat: &mut Catalogue) {
    arithmetic::register(cat);
    predicates::register(cat);
    words_lists::register(cat);
    control::register(cat);
    workspace_prims::register(cat);
    io::register(cat);
    turtle::register(cat);
}

/// Wrap a plain `bool` as the Logo words `"true"`/`"false"`.
pub fn bool_datum(b: bool) -> Datum {
    Datum::word(if b { "true" } else { "false" })
}

/// The inverse of [`bool_datum`]: anything whose printable form
/// case-insensitively reads `true`/`false`.
pub fn want_bool(who: &str, d: &Datum) -> error::Result<bool> {
    match d.as_word().map(|w| w.printable().to_ascii_uppercase()) {
        Some(s) if s == "TRUE" => Ok(true),
        Some(s) if s == "FALSE" => Ok(false),
        _ => error::doesnt_like(None, who, d),
    }
}

pub fn want_number(who: &str, d: &Datum) -> error::Result<f64> {
    match d.as_word().and_then(|w| w.numeric_value()) {
        Some(n) => Ok(n),
        None => error::doesnt_like(None, who, d),
    }
}

pub fn want_word(who: &str, d: &Datum) -> error::Result<Word> {
    match d.as_word() {
        Some(w) => Ok(w.clone()),
        None => error::doesnt_like(None, who, d),
    }
}

pub fn want_list(who: &str, d: &Datum) -> error::Result<List> {
    match d.as_list() {
        Some(l) => Ok(l.clone()),
        None => error::doesnt_like(None, who, d),
    }
}

/// `NOGRAPHICS`: the fallback handler every graphics primitive resolves to
/// while no display back-end is attached.
pub fn no_graphics_error<T>() -> error::Result<T> {
    LogoError::new_as_result(ErrorCode::NoGraphics, None, "no graphics back-end is attached".to_string())
}
