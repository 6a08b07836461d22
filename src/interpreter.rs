//! The single context struct threaded through every primitive: the catalogue,
//! the workspace, the call stack, the print-rendering limits, the
//! ERRACT/CATCH-"ERROR" bookkeeping, and the turtle/terminal collaborators.
//! One struct owns the dictionary, the variable/data state, and the I/O
//! collaborators, passed by `&mut` into every primitive's handler.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::catalogue::Catalogue;
use crate::datum::ast::AstNode;
use crate::datum::error_value::ErrorDatum;
use crate::datum::procedure::ProcedureRef;
use crate::datum::{Datum, List};
use crate::error::{self, ErrorCode, LogoError};
use crate::evaluator::{self, CallStack, StepResult};
use crate::parser;
use crate::reader::{Reader, SourceLocation, StringLineSource};
use crate::surfaces::{NullTurtle, StdioTerminal, TerminalSurface, TurtleSurface};

/// One of the three asynchronous requests an external signal channel may
/// deliver.
/// A headless CLI has no real external sender; `Interpreter::signal` is
/// exposed so an embedder (GUI, test harness) can set it between `poll`
/// points.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signal {
    None,
    Toplevel,
    Pause,
    System,
}

/// The context threaded through every primitive handler.
pub struct Interpreter {
    pub catalogue: Catalogue,
    pub workspace: crate::workspace::Workspace,
    pub call_stack: CallStack,
    pub max_recursion_depth: usize,
    /// The instruction line List currently executing, attached to a
    /// `LogoError` the first time it crosses a call boundary (see
    /// `evaluator::attach_call_stack`), so a `CATCH "ERROR"`'s report list
    /// can name the offending line (spec.md §3's `Error` datum).
    pub current_line: Option<List>,

    /// `PRINTDEPTHLIMIT`/`PRINTWIDTHLIMIT`: `-1` means unlimited.
    pub print_depth_limit: Cell<i64>,
    pub print_width_limit: Cell<i64>,
    /// `CASEIGNOREDP`.
    pub case_ignored: Cell<bool>,
    /// `ALLOWGETSET`, consulted by the parser's command-dispatch fallback.
    pub allow_get_set: Cell<bool>,

    /// `ERRACT`: when non-empty, an error inside a procedure pauses instead
    /// of unwinding.
    pub erract: RefCell<List>,
    /// Set by `CATCH "ERROR` (and read by `ERROR`/`ERRORP` getters) after
    /// the most recent error it absorbed.
    pub last_error: RefCell<Option<ErrorDatum>>,
    /// Guards against re-entrant `PAUSE`.
    pub pausing: Cell<bool>,

    pub signal: Cell<Signal>,

    /// No display back-end is attached in this CLI; graphics primitives
    /// resolve to handlers that raise `NoGraphics`.
    pub graphics_enabled: bool,
    pub turtle: RefCell<Box<dyn TurtleSurface>>,
    pub terminal: RefCell<Box<dyn TerminalSurface>>,

    /// Open file handles keyed by upper-cased path. `CLOSE`/`CLOSEALL` drain this; `readstream`/
    /// `writestream` below point into it.
    pub files: RefCell<HashMap<String, std::fs::File>>,
    pub current_reader_name: RefCell<Option<String>>,
    pub current_writer_name: RefCell<Option<String>>,

    /// Approximates `NODES`: the source counts live Datum allocations via
    /// per-type pools; reproducing that exactly
    /// would require instrumenting every constructor. This crate instead
    /// reports catalogue + global-variable population as a proxy, noted as
    /// a deliberate simplification in DESIGN.md.
    pub nodes_high_water: Cell<i64>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        let mut interp = Interpreter {
            catalogue: Catalogue::new(),
            workspace: crate::workspace::Workspace::new(),
            call_stack: Vec::new(),
            max_recursion_depth: 4096,
            current_line: None,
            print_depth_limit: Cell::new(-1),
            print_width_limit: Cell::new(-1),
            case_ignored: Cell::new(true),
            allow_get_set: Cell::new(false),
            erract: RefCell::new(List::empty()),
            last_error: RefCell::new(None),
            pausing: Cell::new(false),
            signal: Cell::new(Signal::None),
            graphics_enabled: false,
            turtle: RefCell::new(Box::new(NullTurtle::default())),
            terminal: RefCell::new(Box::new(StdioTerminal::default())),
            files: RefCell::new(HashMap::new()),
            current_reader_name: RefCell::new(None),
            current_writer_name: RefCell::new(None),
            nodes_high_water: Cell::new(0),
        };
        crate::builtins::register_all(&mut interp.catalogue);
        interp
    }

    /// Parse (with per-line caching) a user procedure's body, returning both
    /// its flattened statement array and the `TAG` name -> statement-index
    /// table `GOTO` resolves against. Both are computed together here so the
    /// indices always line up with this exact statement array — a body line
    /// holding more than one statement would desync a line-indexed table
    /// from a statement-indexed one. Exposed to `crate::evaluator::call_procedure`.
    #[allow(clippy::type_complexity)]
    pub fn parsed_body(
        &self,
        proc: &ProcedureRef,
    ) -> error::Result<(Vec<AstNode>, HashMap<String, usize>, Vec<List>)> {
        parser::parse_body(&proc.body, &self.catalogue, self.allow_get_set.get())
    }

    /// RUNPARSE + parse one already-tokenized instruction list (a `RUN`/
    /// `APPLY`/macro-expansion/optional-default-expression body), without
    /// consulting a procedure's tag table.
    pub fn parse_instruction_list(&self, list: &List) -> error::Result<Vec<AstNode>> {
        parser::parse_instruction_list(list, &self.catalogue, self.allow_get_set.get())
    }

    /// Poll the signal channel at a safe point. `Toplevel`/`System` unwind via a tagged throw; `Pause`
    /// leaves the flag set for the next `PAUSE`-eligible site to act on.
    pub fn poll_signal(&self) -> error::Result<()> {
        match self.signal.get() {
            Signal::None | Signal::Pause => Ok(()),
            Signal::Toplevel => {
                self.signal.set(Signal::None);
                LogoError::new_as_result(ErrorCode::Throw, None, "TOPLEVEL".to_string())
                .map_err(|e| e.with_throw_tag("TOPLEVEL".to_string()))
            }
            Signal::System => {
                self.signal.set(Signal::None);
                LogoError::new_as_result(ErrorCode::Throw, None, "SYSTEM".to_string())
                .map_err(|e| e.with_throw_tag("SYSTEM".to_string()))
            }
        }
    }

    /// Run one already-parsed top-level statement list: every statement must either produce
    /// `Datum::NoValue` or be absorbed by a control-flow result, since
    /// there is no enclosing procedure call to catch `STOP`/`OUTPUT` here.
    pub fn run_toplevel_statements(&mut self, statements: &[AstNode]) -> error::Result<()> {
        for statement in statements {
            self.poll_signal()?;
            match evaluator::eval_ast_node(self, statement)? {
                StepResult::Value(Datum::NoValue) => {}
                StepResult::Value(other) => {
                    return LogoError::new_as_result(
                        ErrorCode::DoesntLike,
                        None,
                        format!("You don't say what to do with {}", other.show(true, -1, -1)),
                    )
                }
                StepResult::Stop | StepResult::Output(_) | StepResult::MaybeOutput(_) => {
                    return LogoError::new_as_result(
                        ErrorCode::NotInsideProcedure,
                        None,
                        "not inside a procedure".to_string(),
                    )
                }
                StepResult::Goto(tag) => {
                    return LogoError::new_as_result(
                        ErrorCode::NotInsideProcedure,
                        None,
                        format!("GOTO \"{} is not inside a procedure", tag),
                    )
                }
            }
        }
        Ok(())
    }

    /// Read and run an entire script's worth of Logo source. `TO`/`.MACRO`/`.DEFMACRO` are intercepted before
    /// the expression parser ever sees them, matching the reader's special-form note that a
    /// procedure *definition* consumes raw source
    /// lines rather than being parsed as an expression.
    pub fn run_source(&mut self, path: &str, text: &str) -> error::Result<()> {
        let mut source = StringLineSource::new(path, text);
        let mut reader = Reader::new(&mut source);

        loop {
            let line = match reader.read_list_with_prompt("")? {
                Some(l) => l,
                None => break,
            };
            if line.is_empty() {
                continue;
            }
            self.run_one_toplevel_line(&mut reader, line)?;
        }

        Ok(())
    }

    /// Handle one already-read top-level line: either a `TO`/`.MACRO`
    /// definition (which pulls further raw lines from `reader`) or an
    /// ordinary instruction line.
    fn run_one_toplevel_line(&mut self, reader: &mut Reader, line: List) -> error::Result<()> {
        if let Some(first) = line.first().and_then(|d| d.as_word().cloned()) {
            let upper = first.printable().to_ascii_uppercase();
            if matches!(upper.as_str(), "TO" | ".MACRO" | ".DEFMACRO") {
                let is_macro = upper != "TO";
                return self.define_procedure_from_source(reader, line.rest(), is_macro);
            }
        }

        let statements = self.parse_instruction_list(&line)?;
        self.current_line = Some(line);
        self.run_toplevel_statements(&statements)
    }

    /// `TO name :params... [optionals...] [rest] n`: the header line's
    /// tokens are taken as-is; subsequent raw
    /// lines are collected verbatim until a line whose first word is `END`,
    /// which is not itself part of the body.
    fn define_procedure_from_source(
        &mut self,
        reader: &mut Reader,
        header: List,
        is_macro: bool,
    ) -> error::Result<()> {
        let header_items = header.to_vec();
        let name = header_items
        .first()
        .and_then(|d| d.as_word())
        .map(|w| w.printable())
        .ok_or_else(|| LogoError::new(ErrorCode::DoesntLike, None, "TO needs a procedure name".to_string()))?;

        if self.catalogue.is_primitive(&name) {
            return LogoError::new_as_result(
                ErrorCode::IsPrimitive,
                None,
                format!("{} is a primitive and cannot be redefined", name),
            );
        }

        let mut source_lines = vec![Datum::List(header.clone())];
        let mut body_lines = Vec::new();

        loop {
            let body_line = match reader.read_list_with_prompt("~ ")? {
                Some(l) => l,
                None => {
                    return LogoError::new_as_result(
                        ErrorCode::DoesntLike,
                        None,
                        format!("END not found for procedure {}", name),
                    )
                }
            };

            let is_end = body_line
            .first()
            .and_then(|d| d.as_word().cloned())
            .map(|w| w.printable().eq_ignore_ascii_case("END"))
            .unwrap_or(false);

            if is_end {
                break;
            }

            source_lines.push(Datum::List(body_line.clone()));
            body_lines.push(Datum::List(body_line));
        }

        let def = crate::definitions::build_procedure_def(
            &name,
            &header_items[1..],
            body_lines,
            source_lines,
            is_macro,
        )?;

        self.catalogue.define_procedure(def)
    }

    pub fn last_location(&self) -> Option<SourceLocation> {
        None
    }

    /// The interactive REPL loop: read one
    /// top-level line at a time from stdin, run it, and print an uncaught
    /// error instead of exiting, matching UCBLogo's "errors don't kill your
    /// session" behavior. Exits cleanly on EOF (`^D`).
    pub fn run_repl(&mut self) -> error::Result<()> {
        let mut source = crate::reader::StdinLineSource::new(true);
        let mut reader = Reader::new(&mut source);

        loop {
            let line = match reader.read_list_with_prompt("? ") {
                Ok(Some(l)) => l,
                Ok(None) => break,
                Err(err) => {
                    eprintln!("{}", err);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            if let Err(err) = self.run_one_toplevel_line(&mut reader, line) {
                eprintln!("{}", err);
            }
        }

        Ok(())
    }

    /// `PAUSE`'s nested REPL: a fresh read loop over
    /// stdin with a `<procname>? ` prompt. Ordinary statements run exactly
    /// as at the toplevel; `CONTINUE`/`CO` unwinds out of this loop (not
    /// this method's own call stack, which a plain `return` wouldn't reach
    /// from inside `run_one_toplevel_line`) by raising a `LogoError` tagged
    /// `PAUSE-CONTINUE`, caught here and converted into this loop's result.
    /// EOF (`^D`) exits the pause with no value, mirroring `run_repl`'s
    /// plain-EOF exit.
    pub fn run_pause_repl(&mut self, prompt: &str) -> error::Result<Datum> {
        let mut source = crate::reader::StdinLineSource::new(true);
        let mut reader = Reader::new(&mut source);

        loop {
            let line = match reader.read_list_with_prompt(prompt) {
                Ok(Some(l)) => l,
                Ok(None) => return Ok(Datum::NoValue),
                Err(err) => {
                    eprintln!("{}", err);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match self.run_one_toplevel_line(&mut reader, line) {
                Ok(()) => {}
                Err(err) if err.throw_tag().as_deref() == Some("PAUSE-CONTINUE") => {
                    return Ok(err.output().clone().unwrap_or(Datum::NoValue));
                }
                Err(err) => eprintln!("{}", err),
            }
        }
    }
}
