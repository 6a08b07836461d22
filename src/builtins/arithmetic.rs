//! Arithmetic and relational primitives.

use crate::builtins::{bool_datum, prim, want_bool, want_number};
use crate::catalogue::Catalogue;
use crate::datum::Datum;
use crate::error;
use crate::evaluator::{eval_arg, StepResult};

pub fn register(cat: &mut Catalogue) {
    prim!(cat, ["SUM", "+"], 0, 2, -1, |interp, node| {
            let mut total = 0.0;
            for i in 0..node.children.len() {
                total += want_number("SUM", &eval_arg(interp, node, i)?)?;
            }
            Ok(StepResult::Value(Datum::number(total)))
        });

    prim!(cat, "DIFFERENCE", 2, 2, 2, |interp, node| {
            let a = want_number("DIFFERENCE", &eval_arg(interp, node, 0)?)?;
            let b = want_number("DIFFERENCE", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(Datum::number(a - b)))
        });

    prim!(cat, "MINUS", 1, 1, 1, |interp, node| {
            let a = want_number("MINUS", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(Datum::number(-a)))
        });

    prim!(cat, ["PRODUCT", "*"], 0, 2, -1, |interp, node| {
            let mut total = 1.0;
            for i in 0..node.children.len() {
                total *= want_number("PRODUCT", &eval_arg(interp, node, i)?)?;
            }
            Ok(StepResult::Value(Datum::number(total)))
        });

    prim!(cat, "QUOTIENT", 1, 2, 2, |interp, node| {
            if node.children.len() == 1 {
                let a = want_number("QUOTIENT", &eval_arg(interp, node, 0)?)?;
                if a == 0.0 {
                    return error::doesnt_like(None, "QUOTIENT", &Datum::number(a));
                }
                return Ok(StepResult::Value(Datum::number(1.0 / a)));
            }
            let a = want_number("QUOTIENT", &eval_arg(interp, node, 0)?)?;
            let b = want_number("QUOTIENT", &eval_arg(interp, node, 1)?)?;
            if b == 0.0 {
                return error::doesnt_like(None, "QUOTIENT", &Datum::number(b));
            }
            Ok(StepResult::Value(Datum::number(a / b)))
        });

    prim!(cat, "REMAINDER", 2, 2, 2, |interp, node| {
            let a = want_number("REMAINDER", &eval_arg(interp, node, 0)?)?;
            let b = want_number("REMAINDER", &eval_arg(interp, node, 1)?)?;
            if b == 0.0 {
                return error::doesnt_like(None, "REMAINDER", &Datum::number(b));
            }
            Ok(StepResult::Value(Datum::number(a % b)))
        });

    prim!(cat, "MODULO", 2, 2, 2, |interp, node| {
            let a = want_number("MODULO", &eval_arg(interp, node, 0)?)?;
            let b = want_number("MODULO", &eval_arg(interp, node, 1)?)?;
            if b == 0.0 {
                return error::doesnt_like(None, "MODULO", &Datum::number(b));
            }
            Ok(StepResult::Value(Datum::number(a.rem_euclid(b))))
        });

    prim!(cat, ["POWER", "^"], 2, 2, 2, |interp, node| {
            let a = want_number("POWER", &eval_arg(interp, node, 0)?)?;
            let b = want_number("POWER", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(Datum::number(a.powf(b))))
        });

    prim!(cat, ["LESSP", "LESS?"], 2, 2, 2, |interp, node| {
            let a = want_number("LESSP", &eval_arg(interp, node, 0)?)?;
            let b = want_number("LESSP", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(bool_datum(a < b)))
        });

    prim!(cat, ["GREATERP", "GREATER?"], 2, 2, 2, |interp, node| {
            let a = want_number("GREATERP", &eval_arg(interp, node, 0)?)?;
            let b = want_number("GREATERP", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(bool_datum(a > b)))
        });

    prim!(cat, ["NOTGREATERP", "LESSEQUAL?"], 2, 2, 2, |interp, node| {
            let a = want_number("NOTGREATERP", &eval_arg(interp, node, 0)?)?;
            let b = want_number("NOTGREATERP", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(bool_datum(a <= b)))
        });

    prim!(cat, ["NOTLESSP", "GREATEREQUAL?"], 2, 2, 2, |interp, node| {
            let a = want_number("NOTLESSP", &eval_arg(interp, node, 0)?)?;
            let b = want_number("NOTLESSP", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(bool_datum(a >= b)))
        });

    prim!(cat, "EQUALP", 2, 2, 2, |interp, node| {
            let a = eval_arg(interp, node, 0)?;
            let b = eval_arg(interp, node, 1)?;
            Ok(StepResult::Value(bool_datum(a.equals(&b, interp.case_ignored.get()))))
        });

    prim!(cat, "NOTEQUALP", 2, 2, 2, |interp, node| {
            let a = eval_arg(interp, node, 0)?;
            let b = eval_arg(interp, node, 1)?;
            Ok(StepResult::Value(bool_datum(!a.equals(&b, interp.case_ignored.get()))))
        });

    prim!(cat, "AND", 0, 2, -1, |interp, node| {
            for i in 0..node.children.len() {
                if !want_bool("AND", &eval_arg(interp, node, i)?)? {
                    return Ok(StepResult::Value(bool_datum(false)));
                }
            }
            Ok(StepResult::Value(bool_datum(true)))
        });

    prim!(cat, "OR", 0, 2, -1, |interp, node| {
            for i in 0..node.children.len() {
                if want_bool("OR", &eval_arg(interp, node, i)?)? {
                    return Ok(StepResult::Value(bool_datum(true)));
                }
            }
            Ok(StepResult::Value(bool_datum(false)))
        });

    prim!(cat, "NOT", 1, 1, 1, |interp, node| {
            let a = want_bool("NOT", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(bool_datum(!a)))
        });

    prim!(cat, "ABS", 1, 1, 1, |interp, node| {
            let a = want_number("ABS", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(Datum::number(a.abs())))
        });

    prim!(cat, "INT", 1, 1, 1, |interp, node| {
            let a = want_number("INT", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(Datum::number(a.trunc())))
        });

    prim!(cat, "ROUND", 1, 1, 1, |interp, node| {
            let a = want_number("ROUND", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(Datum::number(a.round())))
        });

    prim!(cat, "SQRT", 1, 1, 1, |interp, node| {
            let a = want_number("SQRT", &eval_arg(interp, node, 0)?)?;
            if a < 0.0 {
                return error::doesnt_like(None, "SQRT", &Datum::number(a));
            }
            Ok(StepResult::Value(Datum::number(a.sqrt())))
        });

    prim!(cat, "RANDOM", 1, 1, 2, |interp, node| {
            let lo = want_number("RANDOM", &eval_arg(interp, node, 0)?)?;
            let (lo, hi) = if node.children.len() == 2 {
                (lo, want_number("RANDOM", &eval_arg(interp, node, 1)?)?)
            } else {
                (0.0, lo - 1.0)
            };
            // A from-scratch xorshift rather than pulling in `rand`: the
            // teacher repo has no randomness dependency either, and RANDOM's
            // contract only promises a value in range, not cryptographic
            // quality.
            let seed = interp.workspace.bump_random_seed();
            let span = (hi - lo).floor().max(0.0) as u64 + 1;
            let value = lo + (seed % span) as f64;
            Ok(StepResult::Value(Datum::number(value)))
        });
}
