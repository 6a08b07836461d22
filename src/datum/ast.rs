//! AST nodes produced by the parser (C4) and consumed by the evaluator (C7).
//!
//! Per the redesign flag in, control flow is not smuggled through
//! as a family of sentinel Datum values — `STOP`/`OUTPUT`/`.MAYBEOUTPUT`/
//! `GOTO` are ordinary primitive calls whose handlers return the
//! corresponding [`crate::evaluator::StepResult`] variant, converted back to
//! plain values only at the procedure-call boundary.

use std::rc::Rc;

use super::procedure::ProcedureRef;
use super::word::Word;
use super::Datum;
use crate::error;
use crate::evaluator::StepResult;
use crate::interpreter::Interpreter;

/// The stored dispatch pointer for a primitive: the handler itself plus the
/// arity metadata the parser needs to know how many children to collect.
pub struct Primitive {
    pub name: String,
    pub min_args: i32,
    pub default_args: i32,
    pub max_args: i32,
    pub handler: PrimitiveHandler,
}

pub type PrimitiveHandler =
Rc<dyn Fn(&mut Interpreter, &AstNode) -> error::Result<StepResult>>;

pub type PrimitiveRef = Rc<Primitive>;

/// What a command-position AST node resolves to.
#[derive(Clone)]
pub enum CallTarget {
    Primitive(PrimitiveRef),
    Procedure(ProcedureRef),
    /// `ALLOWGETSET` bare getter of an otherwise-unknown name.
    Getter(String),
    /// `ALLOWGETSET` setter (`SETNAME value`) of an otherwise-unknown name.
    Setter(String),
}

#[derive(Clone)]
pub enum AstOp {
    Call(CallTarget),
    /// A literal value folded into the tree by the parser (numbers, list and
    /// array literals, quoted words).
    Literal(Datum),
    /// `:name` — a variable reference.
    ValueOf(String),
    /// `?`/`?N` — a named-parameter slot inside an `APPLY` template,
    /// resolved against the nearest frame's `explicit_slot_list`. `?` alone (no digits) means slot 1.
    NamedSlot(usize),
}

/// A single parsed expression or statement. Produced only by the parser;
/// consumed only by the evaluator.
#[derive(Clone)]
pub struct AstNode {
    pub name: Word,
    pub op: AstOp,
    pub children: Vec<Datum>,
}

impl AstNode {
    pub fn new(name: Word, op: AstOp, children: Vec<Datum>) -> AstNode {
        AstNode { name, op, children }
    }

    pub fn literal(value: Datum) -> AstNode {
        AstNode::new(Word::from_str(""), AstOp::Literal(value), Vec::new())
    }
}
