//! Parameter-list parsing for `TO`/`.MACRO`/`.DEFMACRO` (C5,
//! "User definition"). Split out of `interpreter.rs` because it is pure
//! (no `&mut Interpreter` needed) and unit-testable in isolation.

use crate::datum::procedure::{OptionalParam, ProcedureDef};
use crate::datum::{Datum, List};
use crate::error::{self, ErrorCode, LogoError};

/// Build a [`ProcedureDef`] from a `TO`/`.MACRO` header's parameter items
/// (everything after the procedure name) and its already-collected body
/// lines. `source_lines` is the header line plus every body line, verbatim,
/// for `FULLTEXT`.
pub fn build_procedure_def(
    name: &str,
    param_items: &[Datum],
    body_lines: Vec<Datum>,
    source_lines: Vec<Datum>,
    is_macro: bool,
) -> error::Result<ProcedureDef> {
    reject_bad_name(name)?;

    let mut required = Vec::new();
    let mut optional = Vec::new();
    let mut rest = None;
    let mut default_override: Option<i32> = None;

    for (idx, item) in param_items.iter().enumerate() {
        if default_override.is_some() {
            return doesnt_like(name, "extra input after the default-argument count");
        }

        match item {
            Datum::Word(w) => {
                if let Some(n) = w.numeric_value() {
                    if idx != param_items.len() - 1 {
                        return doesnt_like(name, "default-argument count must be last");
                    }
                    default_override = Some(n as i32);
                    continue;
                }

                let raw = w.raw();
                let param_name = raw.strip_prefix(':').ok_or_else(|| {
                    LogoError::new(
                        ErrorCode::DoesntLike,
                        None,
                        format!("{} doesn't like {} as a parameter", name, raw),
                    )
                })?;

                if !optional.is_empty() || rest.is_some() {
                    return doesnt_like(name, "required parameters must come before optional/rest ones");
                }
                required.push(param_name.to_string());
            }

            Datum::List(l) => {
                if rest.is_some() {
                    return doesnt_like(name, "only one rest parameter is allowed");
                }

                let sub_items = l.to_vec();
                let param_word = sub_items
                .first()
                .and_then(|d| d.as_word())
                .ok_or_else(|| LogoError::new(ErrorCode::DoesntLike, None, format!("{} has a malformed parameter", name)))?;
                let param_name = param_word
                .raw()
                .strip_prefix(':')
                .ok_or_else(|| LogoError::new(ErrorCode::DoesntLike, None, format!("{} has a malformed parameter", name)))?
                .to_string();

                if sub_items.len() == 1 {
                    rest = Some(param_name);
                } else {
                    optional.push(OptionalParam {
                            name: param_name,
                            default_expr: List::from_vec(sub_items[1..].to_vec()),
                        });
                }
            }

            other => {
                return error::doesnt_like(None, name, other);
            }
        }
    }

    let min_args = required.len() as i32;
    let unbounded_max = required.len() as i32 + optional.len() as i32;
    let max_args = if rest.is_some() { -1 } else { unbounded_max };
    let default_args = match default_override {
        Some(n) => {
            if n < min_args || (max_args != -1 && n > max_args) {
                return doesnt_like(name, "default-argument count out of range");
            }
            n
        }
        None => required.len() as i32 + optional.len() as i32,
    };

    let body = List::from_vec(body_lines);

    Ok(ProcedureDef {
            name: name.to_string(),
            required_params: required,
            optional_params: optional,
            rest_param: rest,
            min_args,
            max_args,
            default_args,
            is_macro,
            body,
            source_text: List::from_vec(source_lines),
            buried: false,
        })
}

/// A procedure name may not parse as a number, nor
/// start with `"`, `:`, `(`, or `)`.
fn reject_bad_name(name: &str) -> error::Result<()> {
    if crate::datum::word::parse_logo_number(name).is_some() {
        return doesnt_like(name, "a procedure name cannot be a number");
    }
    if matches!(name.chars().next(), Some('"') | Some(':') | Some('(') | Some(')')) {
        return doesnt_like(name, "not a legal procedure name");
    }
    Ok(())
}

fn doesnt_like<T>(name: &str, why: &str) -> error::Result<T> {
    LogoError::new_as_result(ErrorCode::DoesntLike, None, format!("TO {}: {}", name, why))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Datum {
        Datum::Word(crate::datum::Word::from_str(s))
    }

    #[test]
    fn required_only() {
        let def = build_procedure_def("SQUARE", &[word(":n")], Vec::new(), Vec::new(), false).unwrap();
        assert_eq!(def.required_params, vec!["n".to_string()]);
        assert_eq!(def.min_args, 1);
        assert_eq!(def.max_args, 1);
    }

    #[test]
    fn optional_with_default_expr() {
        let opt = Datum::List(List::from_vec(vec![word(":n"), word("10")]));
        let def = build_procedure_def("F", &[opt], Vec::new(), Vec::new(), false).unwrap();
        assert_eq!(def.optional_params.len(), 1);
        assert_eq!(def.min_args, 0);
        assert_eq!(def.max_args, 1);
    }

    #[test]
    fn rest_param_is_unbounded() {
        let rest = Datum::List(List::from_vec(vec![word(":more")]));
        let def = build_procedure_def("F", &[rest], Vec::new(), Vec::new(), false).unwrap();
        assert!(def.rest_param.is_some());
        assert_eq!(def.max_args, -1);
    }

}
