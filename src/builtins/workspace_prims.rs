//! Variable and procedure-management primitives.

use crate::builtins::{bool_datum, prim, want_list, want_word};
use crate::catalogue::Catalogue;
use crate::datum::{Datum, List};
use crate::error::{self, ErrorCode, LogoError};
use crate::evaluator::{eval_arg, eval_args, StepResult};

pub fn register(cat: &mut Catalogue) {
    prim!(cat, "MAKE", 2, 2, 2, |interp, node| {
            let name = want_word("MAKE", &eval_arg(interp, node, 0)?)?;
            let value = eval_arg(interp, node, 1)?;
            interp.workspace.set_datum_for_name(&name.printable(), value);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "LOCAL", 1, 1, -1, |interp, node| {
            for arg in eval_args(interp, node)? {
                declare_local(interp, &arg)?;
            }
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "GLOBAL", 1, 1, -1, |interp, node| {
            for arg in eval_args(interp, node)? {
                declare_global(interp, &arg)?;
            }
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "THING", 1, 1, 1, |interp, node| {
            let name = want_word("THING", &eval_arg(interp, node, 0)?)?;
            interp
            .workspace
            .datum_for_name(&name.printable())
            .map(StepResult::Value)
            .ok_or(())
            .or_else(|_| error::no_value(None, &name.printable()))
        });

    prim!(cat, "ERASE", 1, 1, 1, |interp, node| {
            let name = want_word("ERASE", &eval_arg(interp, node, 0)?)?;
            interp.catalogue.erase(&name.printable());
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "ERALL", 0, 0, 0, |interp, _node| {
            for name in interp.catalogue.all_names() {
                interp.catalogue.erase(&name);
            }
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "PPROP", 3, 3, 3, |interp, node| {
            let plist = want_word("PPROP", &eval_arg(interp, node, 0)?)?;
            let prop = want_word("PPROP", &eval_arg(interp, node, 1)?)?;
            let value = eval_arg(interp, node, 2)?;
            interp.workspace.pprop(&plist.printable(), &prop.printable(), value);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "GPROP", 2, 2, 2, |interp, node| {
            let plist = want_word("GPROP", &eval_arg(interp, node, 0)?)?;
            let prop = want_word("GPROP", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(
                    interp.workspace.gprop(&plist.printable(), &prop.printable()).unwrap_or(Datum::List(List::empty())),
                ))
        });

    prim!(cat, "REMPROP", 2, 2, 2, |interp, node| {
            let plist = want_word("REMPROP", &eval_arg(interp, node, 0)?)?;
            let prop = want_word("REMPROP", &eval_arg(interp, node, 1)?)?;
            interp.workspace.remprop(&plist.printable(), &prop.printable());
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "PLIST", 1, 1, 1, |interp, node| {
            let plist = want_word("PLIST", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(Datum::List(interp.workspace.plist(&plist.printable()))))
        });

    prim!(cat, "BURY", 1, 1, 1, |interp, node| {
            let name = want_word("BURY", &eval_arg(interp, node, 0)?)?;
            interp.catalogue.set_buried(&name.printable(), true);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "UNBURY", 1, 1, 1, |interp, node| {
            let name = want_word("UNBURY", &eval_arg(interp, node, 0)?)?;
            interp.catalogue.set_buried(&name.printable(), false);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "TRACE", 1, 1, 1, |interp, node| {
            let name = want_word("TRACE", &eval_arg(interp, node, 0)?)?;
            interp.workspace.set_traced(&name.printable(), true);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "UNTRACE", 1, 1, 1, |interp, node| {
            let name = want_word("UNTRACE", &eval_arg(interp, node, 0)?)?;
            interp.workspace.set_traced(&name.printable(), false);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "POT", 1, 1, 1, |interp, node| {
            let name = want_word("POT", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(bool_datum(interp.workspace.is_name_defined(&name.printable()))))
        });

    prim!(cat, "TEXT", 1, 1, 1, |interp, node| {
            let name = want_word("TEXT", &eval_arg(interp, node, 0)?)?;
            interp
            .catalogue
            .procedure_text(&name.printable())
            .map(|l| StepResult::Value(Datum::List(l)))
            .ok_or(())
            .or_else(|_| error::no_how(None, &name.printable()))
        });

    prim!(cat, "FULLTEXT", 1, 1, 1, |interp, node| {
            let name = want_word("FULLTEXT", &eval_arg(interp, node, 0)?)?;
            interp
            .catalogue
            .procedure_fulltext(&name.printable())
            .map(|l| StepResult::Value(Datum::List(l)))
            .ok_or(())
            .or_else(|_| error::no_how(None, &name.printable()))
        });

    prim!(cat, "COPYDEF", 2, 2, 2, |interp, node| {
            let new_name = want_word("COPYDEF", &eval_arg(interp, node, 0)?)?.printable();
            let old_name = want_word("COPYDEF", &eval_arg(interp, node, 1)?)?.printable();

            if interp.catalogue.is_primitive(&new_name) {
                return LogoError::new_as_result(
                    ErrorCode::IsPrimitive,
                    None,
                    format!("{} is a primitive and cannot be redefined", new_name),
                );
            }

            match interp.catalogue.lookup_procedure(&old_name) {
                Some(def) => {
                    let copy = def.clone_with_name(&new_name);
                    interp.catalogue.define_procedure(copy)?;
                    Ok(StepResult::Value(Datum::NoValue))
                }
                None => error::no_how(None, &old_name),
            }
        });

    prim!(cat, ["CONTENTS", "ALL"], 0, 0, 0, |interp, _node| {
            let names = interp.catalogue.all_names().into_iter().map(|n| Datum::word(&n)).collect();
            Ok(StepResult::Value(Datum::List(List::from_vec(vec![
                                Datum::List(List::from_vec(names)),
                                Datum::List(List::from_vec(
                                        interp.workspace.all_global_names().into_iter().map(|n| Datum::word(&n)).collect(),
                                    )),
                                Datum::List(List::empty()),
                            ]))))
        });

    prim!(cat, "ARITY", 1, 1, 1, |interp, node| {
            let name = want_word("ARITY", &eval_arg(interp, node, 0)?)?;
            match interp.catalogue.arity(&name.printable()) {
                Some((min, default, max)) => Ok(StepResult::Value(Datum::List(List::from_vec(vec![
                                    Datum::number(min as f64),
                                    Datum::number(default as f64),
                                    Datum::number(max as f64),
                                ])))),
                None => error::no_how(None, &name.printable()),
            }
        });

    prim!(cat, "NODES", 0, 0, 0, |interp, _node| {
            let count = interp.catalogue.all_names().len() + interp.workspace.all_global_names().len();
            Ok(StepResult::Value(Datum::number(count as f64)))
        });

    prim!(cat, "RENAME", 2, 2, 2, |interp, node| {
            let old_name = want_word("RENAME", &eval_arg(interp, node, 0)?)?.printable();
            let new_name = want_word("RENAME", &eval_arg(interp, node, 1)?)?.printable();
            if interp.catalogue.rename(&old_name, &new_name) {
                Ok(StepResult::Value(Datum::NoValue))
            } else {
                error::no_how(None, &old_name)
            }
        });

    prim!(cat, "DEFINE", 2, 2, 2, |interp, node| {
            let name = want_word("DEFINE", &eval_arg(interp, node, 0)?)?.printable();
            let text = want_list("DEFINE", &eval_arg(interp, node, 1)?)?;
            let items = text.to_vec();
            let params = items.first().and_then(|d| d.as_list()).cloned().unwrap_or_else(List::empty);
            let body_lines: Vec<Datum> = items.into_iter().skip(1).collect();
            let def = crate::definitions::build_procedure_def(&name, &params.to_vec(), body_lines.clone(), body_lines, false)?;
            interp.catalogue.define_procedure(def)
            .map(|_| StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["PRINTOUT", "PO"], 1, 1, 1, |interp, node| {
            let arg = eval_arg(interp, node, 0)?;
            let names: Vec<crate::datum::Word> = match arg {
                Datum::Word(w) => vec![w],
                Datum::List(l) => l.to_vec().into_iter().map(|d| want_word("PRINTOUT", &d)).collect::<error::Result<_>>()?,
                other => return error::doesnt_like(None, "PRINTOUT", &other),
            };
            for name in names {
                let name = name.printable();
                let def = match interp.catalogue.lookup_procedure(&name) {
                    Some(def) => def,
                    None => return error::no_how(None, &name),
                };
                let text = procedure_definition_text(&def);
                interp.terminal.borrow_mut().print_to_console(&text)?;
            }
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "SAVE", 1, 1, 1, |interp, node| {
            let path = want_word("SAVE", &eval_arg(interp, node, 0)?)?.printable();
            let text = workspace_snapshot(interp);
            std::fs::write(&path, text)?;
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "LOAD", 1, 1, 1, |interp, node| {
            let path = want_word("LOAD", &eval_arg(interp, node, 0)?)?.printable();
            let text = std::fs::read_to_string(&path)?;
            interp.run_source(&path, &text)?;
            Ok(StepResult::Value(Datum::NoValue))
        });
}

/// `SAVE`'s rendering: `PROCEDURES` (unburied `TO`/`.MACRO` definitions, in
/// their original source form), then `MAKE` forms for every global, then
/// `PPROP` forms for every non-empty property list, in that order.
fn workspace_snapshot(interp: &crate::interpreter::Interpreter) -> String {
    let mut out = String::new();

    for name in interp.catalogue.all_names() {
        let Some(def) = interp.catalogue.lookup_procedure(&name) else { continue };
        out.push_str(&procedure_definition_text(&def));
        out.push('\n');
    }

    for name in interp.workspace.all_global_names() {
        if let Some(value) = interp.workspace.datum_for_name(&name) {
            out.push_str("make \"");
            out.push_str(&name);
            out.push(' ');
            out.push_str(&literal_source(&value));
            out.push('\n');
        }
    }

    for plist_name in interp.workspace.all_plist_names() {
        let pairs = interp.workspace.plist(&plist_name).to_vec();
        for pair in pairs.chunks(2) {
            if let [key, value] = pair {
                out.push_str("pprop \"");
                out.push_str(&plist_name);
                out.push_str(" \"");
                out.push_str(&key.print(true, -1, -1));
                out.push(' ');
                out.push_str(&literal_source(value));
                out.push('\n');
            }
        }
    }

    out
}

/// `PRINTOUT`/`SAVE`'s shared rendering of one procedure's `to.. end` (or
/// `.macro.. end`) source form, exactly as originally typed.
fn procedure_definition_text(def: &crate::datum::ProcedureDef) -> String {
    let lines = def.source_text.to_vec();
    let mut out = String::new();
    out.push_str(if def.is_macro { ".macro " } else { "to " });
    if let Some(header) = lines.first() {
        out.push_str(&header.print(true, -1, -1));
    }
    out.push('\n');
    for line in lines.iter().skip(1) {
        out.push_str(&line.print(true, -1, -1));
        out.push('\n');
    }
    out.push_str("end\n");
    out
}

/// Render a value the way it would need to appear after a `MAKE`/`PPROP`
/// source line so re-reading it reproduces the value: a bare `"`-quoted
/// word, a bracketed list, or a braced array — never the unquoted
/// `PRINT`-style rendering that `MAKE "x 1 2` would misparse as two inputs.
fn literal_source(value: &Datum) -> String {
    match value {
        Datum::Word(w) => format!("\"{}", w.print_value(true, -1, -1)),
        other => other.show(true, -1, -1),
    }
}

fn declare_local(interp: &mut crate::interpreter::Interpreter, datum: &Datum) -> error::Result<()> {
    match datum {
        Datum::Word(w) => {
            interp.workspace.set_var_as_local(&w.printable());
            Ok(())
        }
        Datum::List(l) => {
            for item in l.to_vec() {
                declare_local(interp, &item)?;
            }
            Ok(())
        }
        other => error::doesnt_like(None, "LOCAL", other),
    }
}

fn declare_global(interp: &mut crate::interpreter::Interpreter, datum: &Datum) -> error::Result<()> {
    match datum {
        Datum::Word(w) => {
            interp.workspace.set_var_as_global(&w.printable());
            Ok(())
        }
        Datum::List(l) => {
            for item in l.to_vec() {
                declare_global(interp, &item)?;
            }
            Ok(())
        }
        other => error::doesnt_like(None, "GLOBAL", other),
    }
}
