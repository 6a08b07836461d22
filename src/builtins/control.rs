//! Control structures and flow-of-control primitives.
//!
//! `STOP`/`OUTPUT`/`.MAYBEOUTPUT`/`GOTO` return the matching
//! [`crate::evaluator::StepResult`] variant directly rather than raising a
//! Rust error; `CATCH`/`THROW` ride ordinary `Result` propagation instead,
//! per the note on `crate::evaluator::tag_matches`.

use std::time::Duration;

use crate::builtins::{prim, want_list, want_number, want_word};
use crate::catalogue::Catalogue;
use crate::datum::error_value::ErrorDatum;
use crate::datum::{Datum, List};
use crate::error::{self, ErrorCode, LogoError};
use crate::evaluator::{apply_named, eval_arg, run_nested_body, StepResult};

pub fn register(cat: &mut Catalogue) {
    prim!(cat, "IF", 2, 2, 3, |interp, node| {
            let take_then = crate::builtins::want_bool("IF", &eval_arg(interp, node, 0)?)?;
            if take_then {
                run_branch(interp, node, 1)
            } else if node.children.len() == 3 {
                run_branch(interp, node, 2)
            } else {
                Ok(StepResult::Value(Datum::NoValue))
            }
        });

    prim!(cat, "IFELSE", 3, 3, 3, |interp, node| {
            let cond = crate::builtins::want_bool("IFELSE", &eval_arg(interp, node, 0)?)?;
            if cond {
                run_branch(interp, node, 1)
            } else {
                run_branch(interp, node, 2)
            }
        });

    prim!(cat, "REPEAT", 2, 2, 2, |interp, node| {
            let count = want_number("REPEAT", &eval_arg(interp, node, 0)?)? as i64;
            let list = want_list("REPEAT", &eval_arg(interp, node, 1)?)?;
            let statements = interp.parse_instruction_list(&list)?;

            interp.workspace.push_repcount();
            let result = (|| -> error::Result<StepResult> {
                    for _ in 0..count {
                        interp.poll_signal()?;
                        interp.workspace.bump_repcount();
                        match run_nested_body(interp, &statements)? {
                            StepResult::Value(_) => {}
                            other => return Ok(other),
                        }
                    }
                    Ok(StepResult::Value(Datum::NoValue))
                });
            interp.workspace.pop_repcount();
            result
        });

    prim!(cat, "FOREVER", 1, 1, 1, |interp, node| {
            let list = want_list("FOREVER", &eval_arg(interp, node, 0)?)?;
            let statements = interp.parse_instruction_list(&list)?;

            interp.workspace.push_repcount();
            let result = (|| -> error::Result<StepResult> {
                    loop {
                        interp.poll_signal()?;
                        interp.workspace.bump_repcount();
                        match run_nested_body(interp, &statements)? {
                            StepResult::Value(_) => {}
                            other => return Ok(other),
                        }
                    }
                });
            interp.workspace.pop_repcount();
            result
        });

    prim!(cat, "REPCOUNT", 0, 0, 0, |interp, _node| {
            Ok(StepResult::Value(Datum::number(interp.workspace.repcount() as f64)))
        });

    prim!(cat, "TEST", 1, 1, 1, |interp, node| {
            let value = crate::builtins::want_bool("TEST", &eval_arg(interp, node, 0)?)?;
            interp.workspace.set_test(value);
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, ["IFTRUE", "IFT"], 1, 1, 1, |interp, node| {
            match interp.workspace.test_value() {
                Some(true) => run_branch(interp, node, 0),
                Some(false) => Ok(StepResult::Value(Datum::NoValue)),
                None => LogoError::new_as_result(ErrorCode::NoTest, None, "no test has been run".to_string()),
            }
        });

    prim!(cat, ["IFFALSE", "IFF"], 1, 1, 1, |interp, node| {
            match interp.workspace.test_value() {
                Some(false) => run_branch(interp, node, 0),
                Some(true) => Ok(StepResult::Value(Datum::NoValue)),
                None => LogoError::new_as_result(ErrorCode::NoTest, None, "no test has been run".to_string()),
            }
        });

    prim!(cat, "STOP", 0, 0, 0, |_interp, _node| Ok(StepResult::Stop));

    prim!(cat, "OUTPUT", 1, 1, 1, |interp, node| {
            let value = eval_arg(interp, node, 0)?;
            Ok(StepResult::Output(value))
        });

    prim!(cat, ".MAYBEOUTPUT", 1, 1, 1, |interp, node| {
            let value = eval_arg(interp, node, 0)?;
            Ok(StepResult::MaybeOutput(value))
        });

    prim!(cat, "GOTO", 1, 1, 1, |interp, node| {
            let tag = want_word("GOTO", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Goto(tag.printable()))
        });

    // `TAG` itself is a no-op at runtime: `parser::parse_body` records where
    // each `TAG "name` statement sits before the body ever runs, and
    // `evaluator::run_procedure_body` consults that table directly.
    prim!(cat, "TAG", 1, 1, 1, |interp, node| {
            let _ = want_word("TAG", &eval_arg(interp, node, 0)?)?;
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "WAIT", 1, 1, 1, |interp, node| {
            let ticks = want_number("WAIT", &eval_arg(interp, node, 0)?)?;
            if ticks > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(ticks / 60.0));
            }
            Ok(StepResult::Value(Datum::NoValue))
        });

    prim!(cat, "RUN", 1, 1, 1, |interp, node| {
            let value = eval_arg(interp, node, 0)?;
            let list = coerce_to_instruction_list("RUN", value)?;
            let statements = interp.parse_instruction_list(&list)?;
            run_nested_body(interp, &statements)
        });

    prim!(cat, "RUNRESULT", 1, 1, 1, |interp, node| {
            let value = eval_arg(interp, node, 0)?;
            let list = coerce_to_instruction_list("RUNRESULT", value)?;
            let statements = interp.parse_instruction_list(&list)?;
            match run_nested_body(interp, &statements)? {
                StepResult::Output(v) | StepResult::MaybeOutput(v) => {
                    Ok(StepResult::Value(Datum::List(List::from_vec(vec![v]))))
                }
                _ => Ok(StepResult::Value(Datum::List(List::empty()))),
            }
        });

    prim!(cat, "APPLY", 2, 2, 2, |interp, node| {
            let target = eval_arg(interp, node, 0)?;
            let args = want_list("APPLY", &eval_arg(interp, node, 1)?)?.to_vec();
            match target {
                Datum::Word(name) => apply_named(interp, &name.printable(), args),
                Datum::List(template) => apply_template(interp, &template, args),
                other => error::doesnt_like(None, "APPLY", &other),
            }
        });

    prim!(cat, "CATCH", 2, 2, 2, |interp, node| {
            let tag = want_word("CATCH", &eval_arg(interp, node, 0)?)?.printable();
            let list = want_list("CATCH", &eval_arg(interp, node, 1)?)?;
            let statements = interp.parse_instruction_list(&list)?;

            // `ERRACT` applies to errors escaping *out of* a CATCH, not ones this
            // CATCH is itself about to field — otherwise the auto-pause intercept
            // in `evaluator::call_procedure` would steal an error this CATCH's own
            // arms below are waiting to handle. Empty it for the body's duration.
            let saved_erract = interp.erract.borrow().clone();
            *interp.erract.borrow_mut() = List::empty();
            let body_result = run_nested_body(interp, &statements);
            *interp.erract.borrow_mut() = saved_erract;

            match body_result {
                Ok(step) => Ok(step),
                Err(err) => {
                    let caught = tag.eq_ignore_ascii_case("ERROR")
                    || err.throw_tag().as_deref().map(|t| t.eq_ignore_ascii_case(&tag)).unwrap_or(false);

                    if !caught {
                        return Err(err);
                    }

                    // The frames that raised `err` have already unwound by the
                    // time we get here; its snapshotted call stack (see
                    // `evaluator::attach_call_stack`) still names the innermost
                    // procedure that was running, which `workspace.current_*`
                    // no longer can.
                    let procedure_name = err
                    .call_stack()
                    .as_ref()
                    .and_then(|stack| stack.last())
                    .map(|frame| frame.name.clone())
                    .or_else(|| interp.workspace.current_procedure_name().map(|s| s.to_string()));

                    let error_datum = ErrorDatum {
                        code: err.code() as i64,
                        message: crate::datum::Word::from_str(err.message()),
                        tag: err.throw_tag().clone().map(|t| crate::datum::Word::from_str(&t)),
                        output: err.output().clone(),
                        procedure_name,
                        line: err.line().clone(),
                    };
                    *interp.last_error.borrow_mut() = Some(error_datum);

                    // A suppressed error carries no THROW payload most of the
                    // time; UCBLogo's CATCH reports that as an empty list
                    // rather than a no-value sentinel, so `show catch...`
                    // prints `[]` instead of erroring
                    // as SHOW normally would on a true non-value.
                    Ok(StepResult::Value(err.output().clone().unwrap_or(Datum::List(List::empty()))))
                }
            }
        });

    // `ERROR`: the four-element report list left by the most recent
    // `CATCH "ERROR`, or `[]` if nothing has
    // been caught yet.
    prim!(cat, "ERROR", 0, 0, 0, |interp, _node| {
            Ok(StepResult::Value(
                    interp
                    .last_error
                    .borrow()
                    .as_ref()
                    .map(|e| Datum::List(e.as_report_list()))
                    .unwrap_or(Datum::List(List::empty())),
                ))
        });

    // `PAUSE`/`CONTINUE` : normally entered
    // automatically when `ERRACT` is non-empty and a recoverable error
    // fires inside a procedure (see `evaluator::call_procedure`'s pause
    // intercept), but a script may also call `PAUSE` directly to drop into
    // the nested REPL on demand.
    prim!(cat, "PAUSE", 0, 0, 0, |interp, _node| {
            if interp.pausing.get() {
                eprintln!("Already pausing; can't nest PAUSE");
                return Ok(StepResult::Value(Datum::NoValue));
            }
            let prompt = match interp.workspace.current_procedure_name() {
                Some(name) => format!("{}? ", name),
                None => "? ".to_string(),
            };
            interp.pausing.set(true);
            let value = interp.run_pause_repl(&prompt);
            interp.pausing.set(false);
            Ok(StepResult::Value(value?))
        });

    prim!(cat, ["CONTINUE", "CO"], 0, 1, 1, |interp, node| {
            if !interp.pausing.get() {
                return LogoError::new_as_result(
                    ErrorCode::NotInsideProcedure,
                    None,
                    "not inside a PAUSE".to_string(),
                );
            }
            let value = if node.children.len() == 1 { Some(eval_arg(interp, node, 0)?) } else { None };
            let mut err = LogoError::new(ErrorCode::Throw, None, "CONTINUE outside PAUSE".to_string())
            .with_throw_tag("PAUSE-CONTINUE".to_string());
            if let Some(v) = value {
                err = err.with_output(v);
            }
            Err(err)
        });

    prim!(cat, "THROW", 1, 2, 2, |interp, node| {
            let tag = want_word("THROW", &eval_arg(interp, node, 0)?)?.printable();
            let output = if node.children.len() == 2 { Some(eval_arg(interp, node, 1)?) } else { None };

            if tag.eq_ignore_ascii_case("ERROR") {
                if let Some(err) = interp.last_error.borrow_mut().take() {
                    return Err(LogoError::new(
                            error::ErrorCode::Throw,
                            None,
                            err.message().clone(),
                        )
                        .with_throw_tag("ERROR".to_string()));
                }
                return LogoError::new_as_result(ErrorCode::NoCatch, None, "THROW \"ERROR with no pending error".to_string());
            }

            let mut err = LogoError::new(ErrorCode::Throw, None, format!("Throw \"{} is not caught by a CATCH", tag))
            .with_throw_tag(tag);
            if let Some(v) = output {
                err = err.with_output(v);
            }
            Err(err)
        });
}

/// Evaluate `node.children[idx]` (already known to be a bracketed list
/// literal) as a nested instruction list.
fn run_branch(interp: &mut crate::interpreter::Interpreter, node: &crate::datum::ast::AstNode, idx: usize) -> error::Result<StepResult> {
    let list = want_list("IF/IFELSE", &eval_arg(interp, node, idx)?)?;
    let statements = interp.parse_instruction_list(&list)?;
    run_nested_body(interp, &statements)
}

/// `APPLY`'s list-template form: `[print ?]` run with `?` bound to `args`'
/// items via `explicit_slot_list`, in a fresh frame so the
/// binding doesn't leak into the caller once the template returns.
fn apply_template(interp: &mut crate::interpreter::Interpreter, template: &List, args: Vec<Datum>) -> error::Result<StepResult> {
    let statements = interp.parse_instruction_list(template)?;
    interp.workspace.push_frame("APPLY".to_string());
    interp.workspace.set_explicit_slot_list(List::from_vec(args));
    let result = run_nested_body(interp, &statements);
    interp.workspace.pop_frame();
    result
}

/// `RUN`/`RUNRESULT` accept either a List of instructions or a single Word,
/// the latter treated as a one-element instruction list (UCBLogo's "a word
/// is taken as a list containing that word").
fn coerce_to_instruction_list(who: &str, value: Datum) -> error::Result<List> {
    match value {
        Datum::List(l) => Ok(l),
        Datum::Word(_) => Ok(List::from_vec(vec![value])),
        other => error::doesnt_like(None, who, &other),
    }
}
