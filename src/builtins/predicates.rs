//! Type/identity predicates shared across Words, Lists, and Arrays
//!.

use crate::builtins::{bool_datum, prim};
use crate::catalogue::Catalogue;
use crate::evaluator::{eval_arg, StepResult};

pub fn register(cat: &mut Catalogue) {
    prim!(cat, ["EMPTYP", "EMPTY?"], 1, 1, 1, |interp, node| {
            let v = eval_arg(interp, node, 0)?;
            let empty = v.size() == 0 && !v.is_no_value();
            Ok(StepResult::Value(bool_datum(empty)))
        });

    prim!(cat, ["WORDP", "WORD?"], 1, 1, 1, |interp, node| {
            Ok(StepResult::Value(bool_datum(eval_arg(interp, node, 0)?.is_word())))
        });

    prim!(cat, ["LISTP", "LIST?"], 1, 1, 1, |interp, node| {
            Ok(StepResult::Value(bool_datum(eval_arg(interp, node, 0)?.is_list())))
        });

    prim!(cat, ["ARRAYP", "ARRAY?"], 1, 1, 1, |interp, node| {
            Ok(StepResult::Value(bool_datum(eval_arg(interp, node, 0)?.is_array())))
        });

    prim!(cat, ["NUMBERP", "NUMBER?"], 1, 1, 1, |interp, node| {
            Ok(StepResult::Value(bool_datum(eval_arg(interp, node, 0)?.is_number())))
        });

    prim!(cat, ".EQ?", 2, 2, 2, |interp, node| {
            let a = eval_arg(interp, node, 0)?;
            let b = eval_arg(interp, node, 1)?;
            Ok(StepResult::Value(bool_datum(a.is_identical(&b))))
        });

    prim!(cat, ["BEFOREP", "BEFORE?"], 2, 2, 2, |interp, node| {
            let a = crate::builtins::want_word("BEFORE?", &eval_arg(interp, node, 0)?)?;
            let b = crate::builtins::want_word("BEFORE?", &eval_arg(interp, node, 1)?)?;
            Ok(StepResult::Value(bool_datum(a.printable() < b.printable())))
        });

    prim!(cat, ["MEMBERP", "MEMBER?"], 2, 2, 2, |interp, node| {
            let needle = eval_arg(interp, node, 0)?;
            let haystack = eval_arg(interp, node, 1)?;
            Ok(StepResult::Value(bool_datum(haystack.is_member(&needle, interp.case_ignored.get()))))
        });

    prim!(cat, "NAMEP", 1, 1, 1, |interp, node| {
            let name = crate::builtins::want_word("NAMEP", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(bool_datum(interp.workspace.is_name_defined(&name.printable()))))
        });

    prim!(cat, "PROCEDUREP", 1, 1, 1, |interp, node| {
            let name = crate::builtins::want_word("PROCEDUREP", &eval_arg(interp, node, 0)?)?;
            let n = name.printable();
            Ok(StepResult::Value(bool_datum(interp.catalogue.is_procedure(&n) || interp.catalogue.is_primitive(&n))))
        });

    prim!(cat, "PRIMITIVEP", 1, 1, 1, |interp, node| {
            let name = crate::builtins::want_word("PRIMITIVEP", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(bool_datum(interp.catalogue.is_primitive(&name.printable()))))
        });

    prim!(cat, "DEFINEDP", 1, 1, 1, |interp, node| {
            let name = crate::builtins::want_word("DEFINEDP", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(bool_datum(interp.catalogue.is_procedure(&name.printable()))))
        });

    prim!(cat, ["BURIEDP", "BURIED?"], 1, 1, 1, |interp, node| {
            let name = crate::builtins::want_word("BURIEDP", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(bool_datum(interp.catalogue.is_buried(&name.printable()))))
        });
}
