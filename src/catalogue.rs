//! The procedure/primitive catalogue (C5).
//!
//! A single flat, case-insensitive namespace shared by every primitive and
//! every `TO`/`.MACRO` definition, plus the global mutation counter that the
//! List-level parse cache (C3/C4) is invalidated against. A flat map
//! rather than a context-stack design, since Logo procedure definitions are
//! always global (no nested `TO` scopes).

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::datum::ast::{Primitive, PrimitiveRef};
use crate::datum::procedure::{ProcedureDef, ProcedureRef};
use crate::datum::List;
use crate::error::{self, ErrorCode, LogoError};

enum Entry {
    Primitive(PrimitiveRef),
    Procedure(ProcedureRef),
}

/// Holds every primitive and user-defined procedure/macro, keyed by their
/// ASCII-uppercase name. Bumps a single counter on any definition, erasure,
/// or rename so cached runparse/AST results elsewhere can detect staleness.
pub struct Catalogue {
    entries: HashMap<String, Entry>,
    mutation_counter: Cell<u64>,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalogue {
    pub fn new() -> Catalogue {
        Catalogue {
            entries: HashMap::new(),
            mutation_counter: Cell::new(1),
        }
    }

    /// The timestamp RUNPARSE/the parser should compare a List's cache
    /// against: any cache recorded before the most recent definition change
    /// is considered stale.
    pub fn timestamp(&self) -> u64 {
        self.mutation_counter.get()
    }

    fn bump(&self) {
        self.mutation_counter.set(self.mutation_counter.get() + 1);
    }

    pub fn register_primitive(&mut self, primitive: Primitive) {
        let key = ascii_upper(&primitive.name);
        self.entries.insert(key, Entry::Primitive(Rc::new(primitive)));
        self.bump();
    }

    pub fn define_procedure(&mut self, def: ProcedureDef) -> error::Result<()> {
        let key = ascii_upper(&def.name);

        if let Some(Entry::Primitive(_)) = self.entries.get(&key) {
            return LogoError::new_as_result(
                ErrorCode::IsPrimitive,
                None,
                format!("{} is a primitive and cannot be redefined", def.name),
            );
        }

        self.entries.insert(key, Entry::Procedure(Rc::new(def)));
        self.bump();
        Ok(())
    }

    pub fn erase(&mut self, name: &str) -> bool {
        let key = ascii_upper(name);
        let removed = matches!(self.entries.remove(&key), Some(Entry::Procedure(_)));
        if removed {
            self.bump();
        }
        removed
    }

    pub fn rename(&mut self, old_name: &str, new_name: &str) -> bool {
        let old_key = ascii_upper(old_name);
        let new_key = ascii_upper(new_name);

        if let Some(Entry::Procedure(def)) = self.entries.remove(&old_key) {
            let renamed = def.clone_with_name(new_name);
            self.entries.insert(new_key, Entry::Procedure(Rc::new(renamed)));
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn lookup_primitive(&self, name: &str) -> Option<PrimitiveRef> {
        match self.entries.get(&ascii_upper(name)) {
            Some(Entry::Primitive(p)) => Some(p.clone()),
            _ => None,
        }
    }

    pub fn lookup_procedure(&self, name: &str) -> Option<ProcedureRef> {
        match self.entries.get(&ascii_upper(name)) {
            Some(Entry::Procedure(p)) => Some(p.clone()),
            _ => None,
        }
    }

    pub fn is_primitive(&self, name: &str) -> bool {
        matches!(self.entries.get(&ascii_upper(name)), Some(Entry::Primitive(_)))
    }

    pub fn is_procedure(&self, name: &str) -> bool {
        matches!(self.entries.get(&ascii_upper(name)), Some(Entry::Procedure(_)))
    }

    pub fn is_macro(&self, name: &str) -> bool {
        match self.entries.get(&ascii_upper(name)) {
            Some(Entry::Procedure(p)) => p.is_macro,
            _ => false,
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.entries.contains_key(&ascii_upper(name))
    }

    /// `(min default max)` per command dispatch.
    pub fn arity(&self, name: &str) -> Option<(i32, i32, i32)> {
        match self.entries.get(&ascii_upper(name)) {
            Some(Entry::Primitive(p)) => Some((p.min_args, p.default_args, p.max_args)),
            Some(Entry::Procedure(p)) => Some(p.arity()),
            None => None,
        }
    }

    pub fn all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
        .entries
        .iter()
        .filter(|(_, e)| matches!(e, Entry::Procedure(p) if !p.buried))
        .map(|(k, _)| k.clone())
        .collect();
        names.sort();
        names
    }

    pub fn all_primitive_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
        .entries
        .iter()
        .filter(|(_, e)| matches!(e, Entry::Primitive(_)))
        .map(|(k, _)| k.clone())
        .collect();
        names.sort();
        names
    }

    /// `TEXT`/`PRLIST`-style procedure body as a List of (unparsed)
    /// instruction lines, used by `FULLTEXT`/`TEXT`/`EDIT`.
    pub fn procedure_text(&self, name: &str) -> Option<List> {
        self.lookup_procedure(name).map(|p| p.body.clone())
    }

    pub fn procedure_fulltext(&self, name: &str) -> Option<List> {
        self.lookup_procedure(name).map(|p| p.source_text.clone())
    }

    pub fn is_buried(&self, name: &str) -> bool {
        matches!(self.entries.get(&ascii_upper(name)), Some(Entry::Procedure(p)) if p.buried)
    }

    pub fn set_buried(&mut self, name: &str, buried: bool) -> bool {
        let key = ascii_upper(name);
        if let Some(Entry::Procedure(def)) = self.entries.get(&key) {
            let mut new_def = (**def).clone_with_name(&def.name);
            new_def.buried = buried;
            self.entries.insert(key, Entry::Procedure(Rc::new(new_def)));
            true
        } else {
            false
        }
    }
}

fn ascii_upper(s: &str) -> String {
    s.chars()
    .map(|c| if c.is_ascii() { c.to_ascii_uppercase() } else { c })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_def(name: &str) -> ProcedureDef {
        ProcedureDef {
            name: name.to_string(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
            rest_param: None,
            min_args: 0,
            default_args: 0,
            max_args: 0,
            is_macro: false,
            body: List::empty(),
            source_text: List::empty(),
            buried: false,
        }
    }

    #[test]
    fn define_then_lookup() {
        let mut cat = Catalogue::new();
        cat.define_procedure(sample_def("square")).unwrap();
        assert!(cat.is_procedure("SQUARE"));
        assert!(cat.lookup_procedure("square").is_some());
    }

    #[test]
    fn erase_bumps_timestamp() {
        let mut cat = Catalogue::new();
        cat.define_procedure(sample_def("square")).unwrap();
        let before = cat.timestamp();
        cat.erase("square");
        assert!(cat.timestamp() > before);
        assert!(!cat.is_defined("square"));
    }

    #[test]
    fn rename_preserves_body() {
        let mut cat = Catalogue::new();
        cat.define_procedure(sample_def("old")).unwrap();
        assert!(cat.rename("old", "new"));
        assert!(!cat.is_defined("old"));
        assert!(cat.is_defined("new"));
    }
}
