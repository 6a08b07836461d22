//! Word/list/array surgery.

use crate::builtins::{prim, want_list, want_number, want_word};
use crate::catalogue::Catalogue;
use crate::datum::{Array, Datum, List};
use crate::error;
use crate::evaluator::{eval_arg, eval_args, StepResult};

pub fn register(cat: &mut Catalogue) {
    prim!(cat, "FIRST", 1, 1, 1, |interp, node| {
            let v = eval_arg(interp, node, 0)?;
            v.first().map(StepResult::Value).ok_or(()).or_else(|_| error::doesnt_like(None, "FIRST", &v))
        });

    prim!(cat, "LAST", 1, 1, 1, |interp, node| {
            let v = eval_arg(interp, node, 0)?;
            v.last().map(StepResult::Value).ok_or(()).or_else(|_| error::doesnt_like(None, "LAST", &v))
        });

    prim!(cat, ["BUTFIRST", "BF"], 1, 1, 1, |interp, node| {
            let v = eval_arg(interp, node, 0)?;
            v.butfirst().map(StepResult::Value).ok_or(()).or_else(|_| error::doesnt_like(None, "BUTFIRST", &v))
        });

    prim!(cat, ["BUTLAST", "BL"], 1, 1, 1, |interp, node| {
            let v = eval_arg(interp, node, 0)?;
            v.butlast().map(StepResult::Value).ok_or(()).or_else(|_| error::doesnt_like(None, "BUTLAST", &v))
        });

    prim!(cat, "ITEM", 2, 2, 2, |interp, node| {
            let index = want_number("ITEM", &eval_arg(interp, node, 0)?)? as i64;
            let thing = eval_arg(interp, node, 1)?;
            if !thing.index_in_range(index) {
                return error::doesnt_like(None, "ITEM", &Datum::number(index as f64));
            }
            thing.item_at(index).map(StepResult::Value).ok_or(()).or_else(|_| error::doesnt_like(None, "ITEM", &thing))
        });

    prim!(cat, "COUNT", 1, 1, 1, |interp, node| {
            let v = eval_arg(interp, node, 0)?;
            Ok(StepResult::Value(Datum::number(v.size() as f64)))
        });

    prim!(cat, "FPUT", 2, 2, 2, |interp, node| {
            let item = eval_arg(interp, node, 0)?;
            let thing = eval_arg(interp, node, 1)?;
            match &thing {
                Datum::List(l) => Ok(StepResult::Value(Datum::List(List::cons(item, l.clone())))),
                Datum::Word(w) => {
                    let head = want_word("FPUT", &item)?;
                    Ok(StepResult::Value(Datum::word(&format!("{}{}", head.printable(), w.printable()))))
                }
                other => error::doesnt_like(None, "FPUT", other),
            }
        });

    prim!(cat, "LPUT", 2, 2, 2, |interp, node| {
            let item = eval_arg(interp, node, 0)?;
            let thing = eval_arg(interp, node, 1)?;
            match &thing {
                Datum::List(l) => {
                    let mut items = l.to_vec();
                    items.push(item);
                    Ok(StepResult::Value(Datum::List(List::from_vec(items))))
                }
                Datum::Word(w) => {
                    let tail = want_word("LPUT", &item)?;
                    Ok(StepResult::Value(Datum::word(&format!("{}{}", w.printable(), tail.printable()))))
                }
                other => error::doesnt_like(None, "LPUT", other),
            }
        });

    prim!(cat, "WORD", 0, 2, -1, |interp, node| {
            let mut out = String::new();
            for arg in eval_args(interp, node)? {
                out.push_str(&want_word("WORD", &arg)?.printable());
            }
            Ok(StepResult::Value(Datum::word(&out)))
        });

    prim!(cat, ["SENTENCE", "SE"], 0, 2, -1, |interp, node| {
            let mut items = Vec::new();
            for arg in eval_args(interp, node)? {
                match arg {
                    Datum::List(l) => items.extend(l.to_vec()),
                    other => items.push(other),
                }
            }
            Ok(StepResult::Value(Datum::List(List::from_vec(items))))
        });

    prim!(cat, "LIST", 0, 2, -1, |interp, node| {
            let items = eval_args(interp, node)?;
            Ok(StepResult::Value(Datum::List(List::from_vec(items))))
        });

    prim!(cat, "ARRAY", 1, 1, 2, |interp, node| {
            let size = want_number("ARRAY", &eval_arg(interp, node, 0)?)? as usize;
            let origin = if node.children.len() == 2 {
                want_number("ARRAY", &eval_arg(interp, node, 1)?)? as i64
            } else {
                1
            };
            let items = vec![Datum::List(List::empty()); size];
            Ok(StepResult::Value(Datum::Array(Array::new(items, origin))))
        });

    prim!(cat, "COMBINE", 2, 2, 2, |interp, node| {
            let item = eval_arg(interp, node, 0)?;
            let thing = eval_arg(interp, node, 1)?;
            match &thing {
                Datum::Word(w) => {
                    let head = want_word("COMBINE", &item)?;
                    Ok(StepResult::Value(Datum::word(&format!("{}{}", head.printable(), w.printable()))))
                }
                Datum::List(l) => Ok(StepResult::Value(Datum::List(List::cons(item, l.clone())))),
                other => error::doesnt_like(None, "COMBINE", other),
            }
        });

    prim!(cat, "REVERSE", 1, 1, 1, |interp, node| {
            let v = eval_arg(interp, node, 0)?;
            match &v {
                Datum::List(l) => {
                    let mut items = l.to_vec();
                    items.reverse();
                    Ok(StepResult::Value(Datum::List(List::from_vec(items))))
                }
                Datum::Word(w) => {
                    let reversed: String = w.printable().chars().rev().collect();
                    Ok(StepResult::Value(Datum::word(&reversed)))
                }
                other => error::doesnt_like(None, "REVERSE", other),
            }
        });

    prim!(cat, ".SETFIRST", 2, 2, 2, |interp, node| {
            let list = want_list(".SETFIRST", &eval_arg(interp, node, 0)?)?;
            let value = eval_arg(interp, node, 1)?;
            list.set_first(value);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ".SETBF", 2, 2, 2, |interp, node| {
            let list = want_list(".SETBF", &eval_arg(interp, node, 0)?)?;
            let rest = want_list(".SETBF", &eval_arg(interp, node, 1)?)?;
            list.set_butfirst(rest);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ".SETITEM", 3, 3, 3, |interp, node| {
            let index = want_number(".SETITEM", &eval_arg(interp, node, 0)?)? as i64;
            let target = eval_arg(interp, node, 1)?;
            let value = eval_arg(interp, node, 2)?;
            let ok = match &target {
                Datum::List(l) => l.set_item(index as usize, value),
                Datum::Array(a) => a.set_item(index, value),
                other => return error::doesnt_like(None, ".SETITEM", other),
            };
            if !ok {
                return error::doesnt_like(None, ".SETITEM", &Datum::number(index as f64));
            }
            Ok(StepResult::Value(Datum::NoValue))
        });
}
