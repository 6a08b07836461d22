//! Error taxonomy and registrar (C8).
//!
//! A `Result<T>` alias plus a `Display`/`Debug`/`Error`-implementing error
//! type carrying an optional source location and call stack, with a
//! numbered taxonomy layered on top: every `LogoError` carries a stable
//! numeric code, an optional THROW tag, and whether the site is resumable
//! via `CONTINUE`.

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::process::{ExitCode, Termination};

use crate::datum::{Datum, List};
use crate::evaluator::CallStack;
use crate::reader::SourceLocation;

pub type Result<T> = std::result::Result<T, LogoError>;

/// Numeric error codes. Values must match the original QLogo numbering so
/// that `ERROR`'s first element round-trips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i64)]
pub enum ErrorCode {
    StackOverflow = 2,
    TurtleOutOfBounds = 3,
    DoesntLike = 4,
    DidntOutput = 5,
    NotEnough = 6,
    UnexpectedParen = 9,
    ParenNotFound = 10,
    NoValue = 11,
    NotInsideProcedure = 12,
    NoHow = 13,
    NoCatch = 14,
    AlreadyDefined = 15,
    AlreadyDribbling = 17,
    FileSystem = 18,
    TooMany = 8,
    IsPrimitive = 22,
    ToInProc = 23,
    ToInPause = 24,
    NoTest = 25,
    UnexpectedSquare = 26,
    UnexpectedBrace = 27,
    NoGraphics = 28,
    AlreadyOpen = 29,
    CantOpen = 30,
    NotOpen = 31,
    AlreadyFilling = 33,
    Throw = 35,
    InsideRunresult = 38,
    NoApply = 39,
    ListHasMultipleExpressions = 43,
    /// Not part of the original numbering table; used for internal faults
    /// (e.g. stack underflow in a primitive) that have no Logo-visible code.
    Internal = -1,
}

impl ErrorCode {
    /// Is this error kind resumable via `CONTINUE` from inside a `PAUSE`?
    /// An ordinary runtime error that fires mid-expression has an obvious
    /// "substitute this one value and carry on" recovery, so the
    /// semantic/name/most-runtime kinds are recoverable. Non-recoverable:
    /// `StackOverflow` (the call stack itself is in no state to keep
    /// unwinding into a nested REPL), `Throw`/custom THROW (there is no
    /// single value to substitute for an arbitrary tagged non-local exit),
    /// and the lexical/definitional/I-O kinds, which fire outside normal
    /// expression evaluation (reading, `TO` parsing, file handling) where
    /// "continue with this value" doesn't have a sensible target.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            ErrorCode::DoesntLike
                | ErrorCode::DidntOutput
                | ErrorCode::NotEnough
                | ErrorCode::TooMany
                | ErrorCode::NoValue
                | ErrorCode::NoHow
                | ErrorCode::NoTest
                | ErrorCode::NoApply
                | ErrorCode::InsideRunresult
                | ErrorCode::TurtleOutOfBounds
                | ErrorCode::NoGraphics
        )
    }
}

/// Any error that occurs during reading, parsing, or evaluation of Logo
/// source.
#[derive(Clone)]
pub struct LogoError {
    code: ErrorCode,
    location: Option<SourceLocation>,
    message: String,
    /// The tag a `THROW` used, if this error originated from one.
    throw_tag: Option<String>,
    /// The value `.MAYBEOUTPUT`ed by a THROW with a payload, if any.
    output: Option<Datum>,
    call_stack: Option<CallStack>,
    /// The instruction line List that was executing when this error was
    /// raised (`ERROR`'s report list's 4th element). Set either by the
    /// parser, for an error discovered while parsing one particular body
    /// line (e.g. an unknown command name), or by the evaluator attaching
    /// `Interpreter::current_line` the first time the error crosses a call
    /// boundary, for an error raised while a parsed statement runs.
    line: Option<List>,
}

impl Error for LogoError {}

impl Termination for LogoError {
    fn report(self) -> ExitCode {
        eprintln!("{}", self);
        ExitCode::FAILURE
    }
}

impl Display for LogoError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.message)?,
            None => write!(f, "{}", self.message)?,
        }

        if let Some(call_stack) = &self.call_stack {
            write!(f, "\n\nCall stack\n")?;

            for item in call_stack.iter().rev() {
                writeln!(f, "  {}", item)?;
            }
        }

        Ok(())
    }
}

impl Debug for LogoError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl LogoError {
    pub fn new(code: ErrorCode, location: Option<SourceLocation>, message: String) -> LogoError {
        LogoError {
            code,
            location,
            message,
            throw_tag: None,
            output: None,
            call_stack: None,
            line: None,
        }
    }

    pub fn with_call_stack(mut self, call_stack: CallStack) -> LogoError {
        self.call_stack = Some(call_stack);
        self
    }

    pub fn with_line(mut self, line: List) -> LogoError {
        self.line = Some(line);
        self
    }

    pub fn with_throw_tag(mut self, tag: String) -> LogoError {
        self.throw_tag = Some(tag);
        self
    }

    pub fn with_output(mut self, value: Datum) -> LogoError {
        self.output = Some(value);
        self
    }

    pub fn new_as_result<T>(
        code: ErrorCode,
        location: Option<SourceLocation>,
        message: String,
    ) -> Result<T> {
        Err(LogoError::new(code, location, message))
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn location(&self) -> &Option<SourceLocation> {
        &self.location
    }

    pub fn message(&self) -> &String {
        &self.message
    }

    pub fn throw_tag(&self) -> &Option<String> {
        &self.throw_tag
    }

    pub fn output(&self) -> &Option<Datum> {
        &self.output
    }

    pub fn call_stack(&self) -> &Option<CallStack> {
        &self.call_stack
    }

    pub fn line(&self) -> &Option<List> {
        &self.line
    }

    pub fn is_recoverable(&self) -> bool {
        self.code.is_recoverable()
    }

    /// THROW with a custom (non-ERROR) tag. Carries no numeric code of its
    /// own; ERR_THROW is a placeholder so it still displays sensibly if it
    /// ever escapes to the REPL uncaught.
    pub fn custom_throw(tag: String, output: Option<Datum>, location: Option<SourceLocation>) -> LogoError {
        let mut err = LogoError::new(
            ErrorCode::Throw,
            location,
            format!("Throw \"{}\" is not caught by a CATCH", tag),
        );
        err.throw_tag = Some(tag);
        err.output = output;
        err
    }
}

impl From<std::io::Error> for LogoError {
    fn from(error: std::io::Error) -> LogoError {
        LogoError::new(ErrorCode::FileSystem, None, format!("I/O error: {}", error))
    }
}

/// Convenience constructors mirroring the common error messages used across
/// the evaluator and primitive catalogue.
pub fn doesnt_like<T>(location: Option<SourceLocation>, who: &str, what: &Datum) -> Result<T> {
    LogoError::new_as_result(
        ErrorCode::DoesntLike,
        location,
        format!("{} doesn't like {} as input", who, what.show(true, -1, -1)),
    )
}

pub fn no_how<T>(location: Option<SourceLocation>, name: &str) -> Result<T> {
    LogoError::new_as_result(
        ErrorCode::NoHow,
        location,
        format!("I don't know how to {}", name),
    )
}

pub fn not_enough<T>(location: Option<SourceLocation>, who: &str) -> Result<T> {
    LogoError::new_as_result(
        ErrorCode::NotEnough,
        location,
        format!("not enough inputs to {}", who),
    )
}

pub fn too_many<T>(location: Option<SourceLocation>, who: &str) -> Result<T> {
    LogoError::new_as_result(
        ErrorCode::TooMany,
        location,
        format!("too many inputs to {}", who),
    )
}

pub fn no_value<T>(location: Option<SourceLocation>, name: &str) -> Result<T> {
    LogoError::new_as_result(
        ErrorCode::NoValue,
        location,
        format!("{} has no value", name),
    )
}

pub fn didnt_output<T>(location: Option<SourceLocation>, who: &str) -> Result<T> {
    LogoError::new_as_result(
        ErrorCode::DidntOutput,
        location,
        format!("{} didn't output to {}", who, who),
    )
}
