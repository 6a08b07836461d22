//! The tree-walking evaluator (C7, ).
//!
//! Per the redesign flag in, `STOP`/`OUTPUT`/`.MAYBEOUTPUT`/
//! `GOTO` are not sentinel Datum values threaded through statement
//! iteration — they are [`StepResult`] variants that an ordinary primitive
//! call can return, converted back into a plain value (or absorbed as
//! control flow) only at the boundary a given variant targets: a procedure
//! call boundary for `Output`/`Stop`, the enclosing body's tag table for
//! `Goto`.

use std::fmt::{self, Display, Formatter};

use crate::datum::ast::{AstNode, AstOp, CallTarget};
use crate::datum::procedure::ProcedureRef;
use crate::datum::{Datum, List};
use crate::error::{self, ErrorCode, LogoError};
use crate::interpreter::Interpreter;
use crate::reader::SourceLocation;

/// What one evaluation step produced, before the call boundary it targets
/// has had a chance to interpret it.
#[derive(Clone)]
pub enum StepResult {
    /// An ordinary value (including `Datum::NoValue` for a command that
    /// produced nothing).
    Value(Datum),
    /// `STOP`: end the enclosing procedure body now, producing no value.
    Stop,
    /// `OUTPUT`: end the enclosing procedure body now, producing a value.
    Output(Datum),
    /// `.MAYBEOUTPUT`: identical unwind behavior to `Output`, kept as a
    /// separate variant only so primitives/traces can tell which call form
    /// was used.
    MaybeOutput(Datum),
    /// `GOTO "tag`: jump to the named tag within the *current* procedure
    /// body. Never crosses a procedure-call boundary;
    /// `call_procedure` resolves it against the running body's tag table.
    Goto(String),
}

/// One entry in the call stack shown on an uncaught error.
#[derive(Clone)]
pub struct CallFrame {
    pub name: String,
    pub location: Option<SourceLocation>,
}

impl Display for CallFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} ({})", self.name, loc),
            None => write!(f, "{}", self.name),
        }
    }
}

pub type CallStack = Vec<CallFrame>;

/// Evaluate a single AST node, producing the raw [`StepResult`] it yields.
/// Callers that need a plain value should go through [`eval_to_value`]
/// instead, which rejects control-flow results that escaped their proper
/// boundary.
pub fn eval_ast_node(interp: &mut Interpreter, node: &AstNode) -> error::Result<StepResult> {
    match &node.op {
        AstOp::Literal(value) => Ok(StepResult::Value(value.clone())),

        AstOp::ValueOf(name) => match interp.workspace.datum_for_name(name) {
            Some(value) => Ok(StepResult::Value(value)),
            None => error::no_value(None, name),
        },

        AstOp::Call(target) => eval_call(interp, node, target),

        AstOp::NamedSlot(n) => match interp.workspace.explicit_slot_list() {
            Some(list) => list
            .to_vec()
            .get(n.saturating_sub(1))
            .cloned()
            .map(StepResult::Value)
            .ok_or_else(|| LogoError::new(ErrorCode::DoesntLike, None, format!("? {} is out of range", n))),
            None => LogoError::new_as_result(
                ErrorCode::DoesntLike,
                None,
                "? used outside an APPLY template".to_string(),
            ),
        },
    }
}

/// Snapshot `interp.call_stack()` onto an error the first time it passes a
/// call boundary, so a `CATCH` (or an uncaught error reaching the REPL)
/// still knows which procedure was running once the frames that raised it
/// have unwound. Also attaches `interp.current_line`, the first time, so
/// the same error's report list can name the offending instruction line.
fn attach_call_stack(interp: &Interpreter, err: LogoError) -> LogoError {
    let err = if err.call_stack().is_some() {
        err
    } else {
        err.with_call_stack(interp.call_stack.clone())
    };

    if err.line().is_some() {
        err
    } else {
        match &interp.current_line {
            Some(line) => err.with_line(line.clone()),
            None => err,
        }
    }
}

/// Spec.md §4.7's statement-iteration rule: a body statement that produces a
/// real value (not `Datum::NoValue`, and not absorbed as one of the other
/// `StepResult` variants) has nowhere for that value to go.
fn dont_say(value: &Datum) -> error::Result<StepResult> {
    LogoError::new_as_result(
        ErrorCode::DoesntLike,
        None,
        format!("You don't say what to do with {}", value.show(true, -1, -1)),
    )
}

fn should_auto_pause(interp: &Interpreter, err: &LogoError) -> bool {
    !interp.pausing.get() && err.is_recoverable() && !interp.erract.borrow().is_empty()
}

/// Print `err` (consuming it as `ERRACT`'s "clear the error" step — the
/// REPL never sees it, so `interp.last_error` is deliberately left alone
/// here), then run the nested `PAUSE` REPL and return whatever `CONTINUE`
/// supplies.
fn enter_auto_pause(interp: &mut Interpreter, err: &LogoError) -> error::Result<Datum> {
    eprintln!("{}", err);
    let prompt = match interp.workspace.current_procedure_name() {
        Some(name) => format!("{}? ", name),
        None => "? ".to_string(),
    };
    interp.pausing.set(true);
    let value = interp.run_pause_repl(&prompt);
    interp.pausing.set(false);
    value
}

fn eval_call(interp: &mut Interpreter, node: &AstNode, target: &CallTarget) -> error::Result<StepResult> {
    match target {
        CallTarget::Primitive(primitive) => {
            interp.call_stack.push(CallFrame { name: primitive.name.clone(), location: None });
            let result = (primitive.handler)(interp, node).map_err(|e| attach_call_stack(interp, e));
            interp.call_stack.pop();
            result
        }

        CallTarget::Procedure(proc) => {
            let mut args = Vec::with_capacity(node.children.len());
            for child in &node.children {
                args.push(eval_child_to_value(interp, child)?);
            }
            call_procedure(interp, proc, args)
        }

        CallTarget::Getter(name) => match interp.workspace.datum_for_name(name) {
            Some(value) => Ok(StepResult::Value(value)),
            None => error::no_how(None, name).map_err(|e| attach_call_stack(interp, e)),
        },

        CallTarget::Setter(name) => {
            let child = node
            .children
            .first()
            .ok_or(())
            .map_err(|_| LogoError::new(ErrorCode::NotEnough, None, format!("not enough inputs to {}", name)))?;
            let value = eval_child_to_value(interp, child)?;
            interp.workspace.set_datum_for_name(name, value);
            Ok(StepResult::Value(Datum::NoValue))
        }
    }
}

/// Arguments are themselves `Datum::Ast` children wrapping an already-built
/// expression tree (the parser folds pure literals directly into
/// `Datum::Ast(..Literal..)` rather than inventing a separate argument
/// type). Evaluate it and require a real value come back.
///
/// Exposed to `crate::builtins` so a primitive's handler can resolve its own
/// `node.children[i]` without reaching into evaluator internals.
pub fn eval_child_to_value(interp: &mut Interpreter, child: &Datum) -> error::Result<Datum> {
    match child {
        Datum::Ast(node) => eval_to_value(interp, node),
        other => Ok(other.clone()),
    }
}

/// Evaluate the `idx`th child of a call node to a plain value. Used
/// pervasively by primitive handlers, which receive the call `AstNode` and
/// must evaluate their own arguments (the catalogue dispatch has already
/// checked arity against `min`/`default`/`max`, so an out-of-range `idx`
/// here is always an internal bug, not a user-reachable error).
pub fn eval_arg(interp: &mut Interpreter, node: &AstNode, idx: usize) -> error::Result<Datum> {
    eval_child_to_value(interp, &node.children[idx])
}

/// Evaluate every child of a call node, in left-to-right order.
pub fn eval_args(interp: &mut Interpreter, node: &AstNode) -> error::Result<Vec<Datum>> {
    let mut out = Vec::with_capacity(node.children.len());
    for child in &node.children {
        out.push(eval_child_to_value(interp, child)?);
    }
    Ok(out)
}

/// Evaluate a node and require that it produced a plain value: `Stop`/
/// `Goto` escaping into argument position is an internal fault (the parser
/// never places them there), and `Output`/`MaybeOutput` is unwrapped to its
/// payload, matching how a nested operation call's `OUTPUT` becomes that
/// call's value to its caller.
pub fn eval_to_value(interp: &mut Interpreter, node: &AstNode) -> error::Result<Datum> {
    match eval_ast_node(interp, node)? {
        StepResult::Value(v) => Ok(v),
        StepResult::Output(v) | StepResult::MaybeOutput(v) => Ok(v),
        StepResult::Stop => Ok(Datum::NoValue),
        StepResult::Goto(tag) => LogoError::new_as_result(
            ErrorCode::Internal,
            None,
            format!("GOTO \"{} escaped expression position", tag),
        ),
    }
}

/// Run a bracketed instruction list nested inside a statement (an `IF`
/// branch, a `REPEAT`/`FOREVER` body, `RUN`'s argument,...). A `GOTO`
/// encountered here targets the *enclosing procedure's* tag table, not
/// this list's own (nonexistent) statement indices, so it is never
/// resolved at this level — it is returned unchanged, to be interpreted
/// only by the procedure-call loop that owns the matching statement
/// array ("GOTO handling" is scoped to "the enclosing
/// procedure", not the innermost bracketed list).
pub fn run_nested_body(interp: &mut Interpreter, statements: &[AstNode]) -> error::Result<StepResult> {
    for statement in statements {
        match eval_ast_node(interp, statement)? {
            StepResult::Value(Datum::NoValue) => {}
            StepResult::Value(v) => return dont_say(&v),
            other => return Ok(other),
        }
    }
    Ok(StepResult::Value(Datum::NoValue))
}

/// Run a procedure's own top-level body (a flat instruction list of
/// statement AST nodes), resolving `GOTO` jumps against `tags` by indexing
/// back into `statements` — this is the *only* place a `Goto` step result
/// is ever turned into a jump; every nested body (`run_nested_body`) just
/// forwards an unresolved `Goto` up until it reaches here.
fn run_procedure_body(
    interp: &mut Interpreter,
    statements: &[AstNode],
    tags: &std::collections::HashMap<String, usize>,
    lines: &[List],
) -> error::Result<StepResult> {
    let mut pc = 0usize;
    // A body can only ever jump backward/forward a bounded number of times
    // before either stopping or looping forever by the user's own design;
    // we don't impose an artificial bound here; infinite GOTO loops are a
    // user program's prerogative (mirrors `FOREVER`).
    while pc < statements.len() {
        if let Some(line) = lines.get(pc) {
            interp.current_line = Some(line.clone());
        }
        let step = eval_ast_node(interp, &statements[pc])?;
        match step {
            StepResult::Value(Datum::NoValue) => pc += 1,
            StepResult::Value(v) => return dont_say(&v),
            StepResult::Stop => return Ok(StepResult::Stop),
            StepResult::Output(v) => return Ok(StepResult::Output(v)),
            StepResult::MaybeOutput(v) => return Ok(StepResult::MaybeOutput(v)),
            StepResult::Goto(tag) => match tags.get(&ascii_upper(&tag)) {
                Some(&target) => pc = target,
                None => {
                    return LogoError::new_as_result(
                        ErrorCode::NoHow,
                        None,
                        format!("no tag named {} in this procedure", tag),
                    )
                }
            },
        }
    }
    Ok(StepResult::Value(Datum::NoValue))
}

/// Bind arguments into a fresh frame and run a user-defined procedure's
/// body. Macros trampoline: the body's output is itself a List of
/// instructions, re-run in the *caller's* frame rather than treated as a
/// value.
pub fn call_procedure(interp: &mut Interpreter, proc: &ProcedureRef, args: Vec<Datum>) -> error::Result<StepResult> {
    if interp.workspace.depth() >= interp.max_recursion_depth {
        return LogoError::new_as_result(ErrorCode::StackOverflow, None, "stack overflow".to_string());
    }

    bind_parameters(interp, proc, args)?;
    interp.call_stack.push(CallFrame { name: proc.name.clone(), location: None });

    let body_result = match interp.parsed_body(proc) {
        Ok((statements, tags, lines)) => run_procedure_body(interp, &statements, &tags, &lines),
        Err(e) => Err(e),
    }
    .map_err(|e| attach_call_stack(interp, e));

    // `ERRACT`-driven `PAUSE` : while this procedure's own
    // frame/call-stack entry is still live (so `current_procedure_name`
    // names *it*, not its caller), a recoverable error becomes whatever
    // value the user supplies to `CONTINUE` from inside the nested REPL,
    // swallowed right here rather than propagated further. `CATCH`
    // temporarily empties `ERRACT` around its own body (control.rs), so an
    // error a `CATCH` is about to handle never reaches this intercept.
    let body_result = match body_result {
        Err(e) if should_auto_pause(interp, &e) => Ok(StepResult::Value(enter_auto_pause(interp, &e)?)),
        other => other,
    };

    interp.call_stack.pop();
    interp.workspace.pop_frame();

    let result = body_result?;

    if proc.is_macro {
        trampoline_macro_result(interp, result)
    } else {
        Ok(result)
    }
}

/// A macro's `OUTPUT`ed list is itself unparsed Logo source, evaluated as
/// if it had been written in place of the macro call.
fn trampoline_macro_result(interp: &mut Interpreter, result: StepResult) -> error::Result<StepResult> {
    match result {
        StepResult::Output(Datum::List(instructions)) | StepResult::MaybeOutput(Datum::List(instructions)) => {
            let statements = interp.parse_instruction_list(&instructions)?;
            run_nested_body(interp, &statements)
        }
        StepResult::Output(other) | StepResult::MaybeOutput(other) => error::doesnt_like(
            None,
            "macro expansion",
            &other,
        ),
        other => Ok(other),
    }
}

fn bind_parameters(interp: &mut Interpreter, proc: &ProcedureRef, mut args: Vec<Datum>) -> error::Result<()> {
    let required = proc.required_params.len();
    let optional = proc.optional_params.len();

    if args.len() < required {
        return error::not_enough(None, &proc.name);
    }
    if proc.rest_param.is_none() && args.len() > required + optional {
        return error::too_many(None, &proc.name);
    }

    interp.workspace.push_frame(proc.name.clone());

    let rest_args: Vec<Datum> = if args.len() > required + optional {
        args.split_off(required + optional)
    } else {
        Vec::new()
    };

    let mut args_iter = args.into_iter();

    for name in &proc.required_params {
        let value = args_iter.next().expect("checked required count above");
        interp.workspace.set_var_as_local(name);
        interp.workspace.set_datum_for_name(name, value);
    }

    for opt in &proc.optional_params {
        interp.workspace.set_var_as_local(&opt.name);
        let value = match args_iter.next() {
            Some(v) => v,
            None => {
                let statements = interp.parse_instruction_list(&opt.default_expr)?;
                match run_nested_body(interp, &statements)? {
                    StepResult::Output(v) | StepResult::MaybeOutput(v) | StepResult::Value(v) => v,
                    StepResult::Stop => Datum::NoValue,
                    StepResult::Goto(_) => Datum::NoValue,
                }
            }
        };
        interp.workspace.set_datum_for_name(&opt.name, value);
    }

    if let Some(rest_name) = &proc.rest_param {
        interp.workspace.set_var_as_local(rest_name);
        interp.workspace.set_datum_for_name(rest_name, Datum::List(crate::datum::List::from_vec(rest_args)));
    }

    Ok(())
}

fn ascii_upper(s: &str) -> String {
    s.chars()
    .map(|c| if c.is_ascii() { c.to_ascii_uppercase() } else { c })
    .collect()
}

/// `APPLY`/`FOREACH`/`MAP`/`.MACRO`-adjacent callers that already hold an
/// evaluated argument list and a procedure/primitive name rather than an
/// `AstNode` to dispatch through the parser: build a throwaway call node
/// whose children are the already-evaluated arguments (carried as literal
/// `Datum`s, not `Ast`-wrapped, so `eval_child_to_value` returns them
/// unchanged) and run it exactly as `eval_call` would have.
pub fn apply_named(interp: &mut Interpreter, name: &str, args: Vec<Datum>) -> error::Result<StepResult> {
    if let Some(proc) = interp.catalogue.lookup_procedure(name) {
        return call_procedure(interp, &proc, args);
    }

    if let Some(primitive) = interp.catalogue.lookup_primitive(name) {
        let node = AstNode::new(
            crate::datum::Word::from_str(name),
            AstOp::Call(CallTarget::Primitive(primitive.clone())),
            args,
        );
        interp.call_stack.push(CallFrame { name: primitive.name.clone(), location: None });
        let result = (primitive.handler)(interp, &node);
        interp.call_stack.pop();
        return result;
    }

    error::no_how(None, name)
}

/// `CATCH`/`THROW` ride on ordinary Rust error propagation rather than a
/// `StepResult` variant: `THROW` raises a [`LogoError::custom_throw`] (or,
/// for `THROW "ERROR`, re-raises whatever error it was given) and `CATCH`
/// runs its body, intercepting an `Err` whose tag matches — see
/// `builtins::control::catch`/`builtins::control::throw`.
pub fn tag_matches(tag: &str, candidate: &str) -> bool {
    tag.eq_ignore_ascii_case(candidate)
}
