//! The Procedure variant of the Datum value model.

use std::rc::Rc;

use super::list::List;

/// A single optional parameter: its name and the (unevaluated) default
/// expression to run in the new frame if the caller omits it.
#[derive(Clone)]
pub struct OptionalParam {
    pub name: String,
    pub default_expr: List,
}

/// A user-defined procedure or macro, as recorded by `TO`/`.MACRO`.
#[derive(Clone)]
pub struct ProcedureDef {
    pub name: String,
    pub required_params: Vec<String>,
    pub optional_params: Vec<OptionalParam>,
    pub rest_param: Option<String>,

    pub min_args: i32,
    pub max_args: i32,
    /// The unparenthesized call's argument count; -1 marks a "special form"
    /// whose parser consumes the rest of the source line unevaluated.
    pub default_args: i32,

    pub is_macro: bool,

    /// Body lines, each itself a List of (unparsed) instructions.
    pub body: List,

    /// The original source text, line by line, for `FULLTEXT`.
    pub source_text: List,

    pub buried: bool,
}

pub type ProcedureRef = Rc<ProcedureDef>;

impl ProcedureDef {
    pub fn arity(&self) -> (i32, i32, i32) {
        (self.min_args, self.default_args, self.max_args)
    }

    /// A copy of this definition under a new name, for `RENAME`/`COPYDEF`.
    pub fn clone_with_name(&self, new_name: &str) -> ProcedureDef {
        let mut copy = self.clone();
        copy.name = new_name.to_string();
        copy
    }
}
