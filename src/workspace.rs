//! The variable frame stack and property-list workspace (C6).
//!
//! Logo variables are dynamically scoped: `LOCAL` declares a binding in the
//! current call frame; `MAKE` assigns to the nearest enclosing frame that
//! already declares the name, falling back to a global if none does. A
//! mark/release idiom over a stack of per-frame maps, since Logo frames
//! nest by procedure call, not by lexical block.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::datum::{Datum, List};

/// One procedure-call's worth of dynamically-scoped state.
pub struct Frame {
    vars: RefCell<HashMap<String, Datum>>,

    /// `TEST`'s remembered boolean, consulted by `IFTRUE`/`IFFALSE`. `None`
    /// until the first `TEST` in this frame (or an ancestor, for frames that
    /// inherit it — "TEST is dynamically scoped like a
    /// variable").
    test_value: Cell<Option<bool>>,

    /// The list of formal parameter names this frame's procedure call was
    /// entered with, consulted by `#` and `NAMEP`-adjacent introspection.
    pub explicit_slot_list: RefCell<Option<List>>,

    /// The procedure name this frame belongs to, `None` for the toplevel.
    pub procedure_name: Option<String>,

    /// `REPEAT`/`FOREVER` repetition counters, one per currently active
    /// loop in this frame, consulted by `REPCOUNT`.
    repcount_stack: RefCell<Vec<i64>>,
}

impl Frame {
    fn new(procedure_name: Option<String>) -> Frame {
        Frame {
            vars: RefCell::new(HashMap::new()),
            test_value: Cell::new(None),
            explicit_slot_list: RefCell::new(None),
            procedure_name,
            repcount_stack: RefCell::new(Vec::new()),
        }
    }
}

/// The dynamic-scope stack plus the global variable table and property
/// lists.
pub struct Workspace {
    frames: Vec<Frame>,
    globals: RefCell<HashMap<String, Datum>>,
    /// `PPROP`/`GPROP`/`REMPROP`/`PLIST`: `plist name -> (property -> value)`.
    property_lists: RefCell<HashMap<String, HashMap<String, Datum>>>,
    traced: RefCell<std::collections::HashSet<String>>,
    stepped: RefCell<std::collections::HashSet<String>>,
    /// State for `RANDOM`'s xorshift generator.
    random_state: Cell<u64>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Workspace {
        Workspace {
            frames: vec![Frame::new(None)],
            globals: RefCell::new(HashMap::new()),
            property_lists: RefCell::new(HashMap::new()),
            traced: RefCell::new(std::collections::HashSet::new()),
            stepped: RefCell::new(std::collections::HashSet::new()),
            random_state: Cell::new(0x9E3779B97F4A7C15),
        }
    }

    /// Advance and return the next xorshift64 value for `RANDOM`.
    pub fn bump_random_seed(&self) -> u64 {
        let mut x = self.random_state.get();
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.random_state.set(x);
        x
    }

    pub fn push_frame(&mut self, procedure_name: String) {
        self.frames.push(Frame::new(Some(procedure_name)));
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() == 1 {
            panic!("popping the toplevel workspace frame");
        }
        self.frames.pop();
    }

    pub fn current_frame(&self) -> &Frame {
        self.frames.last().expect("workspace always has a frame")
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current_procedure_name(&self) -> Option<&str> {
        self.current_frame().procedure_name.as_deref()
    }

    /// `:name` lookup: walk the frame stack innermost-first, then fall back
    /// to globals.
    pub fn datum_for_name(&self, name: &str) -> Option<Datum> {
        let key = ascii_upper(name);
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.vars.borrow().get(&key) {
                return Some(value.clone());
            }
        }
        self.globals.borrow().get(&key).cloned()
    }

    pub fn is_name_defined(&self, name: &str) -> bool {
        self.datum_for_name(name).is_some()
    }

    /// `MAKE`: assign to the nearest frame (innermost to outermost) that
    /// already declares `name`; if none does, create a global.
    pub fn set_datum_for_name(&self, name: &str, value: Datum) {
        let key = ascii_upper(name);
        for frame in self.frames.iter().rev() {
            if frame.vars.borrow().contains_key(&key) {
                frame.vars.borrow_mut().insert(key, value);
                return;
            }
        }
        self.globals.borrow_mut().insert(key, value);
    }

    /// `LOCAL`: declare (or reset) `name` in the current frame only,
    /// initially with no value until assigned.
    pub fn set_var_as_local(&self, name: &str) {
        let key = ascii_upper(name);
        self.current_frame()
        .vars
        .borrow_mut()
        .entry(key)
        .or_insert(Datum::NoValue);
    }

    /// `GLOBAL`: declare `name` directly in the global table.
    pub fn set_var_as_global(&self, name: &str) {
        let key = ascii_upper(name);
        self.globals.borrow_mut().entry(key).or_insert(Datum::NoValue);
    }

    pub fn erase_global(&self, name: &str) -> bool {
        self.globals.borrow_mut().remove(&ascii_upper(name)).is_some()
    }

    pub fn all_global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.globals.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    // --- TEST/IFTRUE/IFFALSE -------------------------------------------

    pub fn set_test(&self, value: bool) {
        self.current_frame().test_value.set(Some(value));
    }

    /// `IFTRUE`/`IFFALSE` consult the nearest frame (this one or an
    /// ancestor) that has ever run `TEST`, matching UCBLogo's dynamic-scope
    /// treatment of the flip-flop.
    pub fn test_value(&self) -> Option<bool> {
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.test_value.get() {
                return Some(v);
            }
        }
        None
    }

    // --- REPCOUNT --------------------------------------------------------

    pub fn push_repcount(&self) {
        self.current_frame().repcount_stack.borrow_mut().push(0);
    }

    pub fn pop_repcount(&self) {
        self.current_frame().repcount_stack.borrow_mut().pop();
    }

    pub fn bump_repcount(&self) {
        if let Some(top) = self.current_frame().repcount_stack.borrow_mut().last_mut() {
            *top += 1;
        }
    }

    pub fn repcount(&self) -> i64 {
        self.current_frame()
        .repcount_stack
        .borrow()
        .last()
        .copied()
        .unwrap_or(-1)
    }

    // --- Named slots (`?`/`?N` inside an `APPLY` template) ----------------

    pub fn set_explicit_slot_list(&self, list: List) {
        *self.current_frame().explicit_slot_list.borrow_mut() = Some(list);
    }

    /// Resolved dynamically like `TEST`, walking frames outward so a nested
    /// `IF`/`REPEAT` body inside an `APPLY` template still sees the
    /// enclosing template's slot list.
    pub fn explicit_slot_list(&self) -> Option<List> {
        for frame in self.frames.iter().rev() {
            if let Some(l) = frame.explicit_slot_list.borrow().clone() {
                return Some(l);
            }
        }
        None
    }

    // --- Property lists ----------------------------------------------------

    pub fn pprop(&self, plist_name: &str, property: &str, value: Datum) {
        let mut lists = self.property_lists.borrow_mut();
        lists
        .entry(ascii_upper(plist_name))
        .or_default()
        .insert(ascii_upper(property), value);
    }

    pub fn gprop(&self, plist_name: &str, property: &str) -> Option<Datum> {
        self.property_lists
        .borrow()
        .get(&ascii_upper(plist_name))?
        .get(&ascii_upper(property))
        .cloned()
    }

    pub fn remprop(&self, plist_name: &str, property: &str) -> bool {
        let mut lists = self.property_lists.borrow_mut();
        match lists.get_mut(&ascii_upper(plist_name)) {
            Some(plist) => plist.remove(&ascii_upper(property)).is_some(),
            None => false,
        }
    }

    pub fn plist(&self, plist_name: &str) -> List {
        let lists = self.property_lists.borrow();
        let mut items = Vec::new();
        if let Some(plist) = lists.get(&ascii_upper(plist_name)) {
            for (k, v) in plist.iter() {
                items.push(Datum::word(k));
                items.push(v.clone());
            }
        }
        List::from_vec(items)
    }

    /// `SAVE`'s property-list sweep: every plist name that currently holds
    /// at least one property, sorted for a deterministic snapshot.
    pub fn all_plist_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
        .property_lists
        .borrow()
        .iter()
        .filter(|(_, props)| !props.is_empty())
        .map(|(name, _)| name.clone())
        .collect();
        names.sort();
        names
    }

    pub fn is_plist(&self, plist_name: &str) -> bool {
        self.property_lists
        .borrow()
        .get(&ascii_upper(plist_name))
        .map(|p| !p.is_empty())
        .unwrap_or(false)
    }

    // --- Trace/step flags ------------------------------------------------

    pub fn set_traced(&self, name: &str, traced: bool) {
        let key = ascii_upper(name);
        if traced {
            self.traced.borrow_mut().insert(key);
        } else {
            self.traced.borrow_mut().remove(&key);
        }
    }

    pub fn is_traced(&self, name: &str) -> bool {
        self.traced.borrow().contains(&ascii_upper(name))
    }

    pub fn set_stepped(&self, name: &str, stepped: bool) {
        let key = ascii_upper(name);
        if stepped {
            self.stepped.borrow_mut().insert(key);
        } else {
            self.stepped.borrow_mut().remove(&key);
        }
    }

    pub fn is_stepped(&self, name: &str) -> bool {
        self.stepped.borrow().contains(&ascii_upper(name))
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

    #[test]
    fn local_shadows_outer_frame() {
        let mut ws = Workspace::new();
        ws.set_datum_for_name("X", Datum::number(1.0));
        ws.push_frame("FOO".to_string());
        ws.set_var_as_local("X");
        ws.set_datum_for_name("X", Datum::number(2.0));
        assert_eq!(ws.datum_for_name("X").unwrap().as_word().unwrap().numeric_value(), Some(2.0));
        ws.pop_frame();
        assert_eq!(ws.datum_for_name("X").unwrap().as_word().unwrap().numeric_value(), Some(1.0));
    }

    #[test]
    fn make_without_local_assigns_global() {
        let mut ws = Workspace::new();
        ws.push_frame("FOO".to_string());
        ws.set_datum_for_name("Y", Datum::number(9.0));
        ws.pop_frame();
        assert_eq!(ws.datum_for_name("Y").unwrap().as_word().unwrap().numeric_value(), Some(9.0));
    }

    #[test]
    fn test_value_is_dynamically_scoped() {
        let mut ws = Workspace::new();
        ws.set_test(true);
        ws.push_frame("FOO".to_string());
        assert_eq!(ws.test_value(), Some(true));
        ws.pop_frame();
    }

    #[test]
    fn property_list_roundtrip() {
        let ws = Workspace::new();
        ws.pprop("turtle", "color", Datum::word("red"));
        assert!(ws.gprop("turtle", "color").unwrap().equals(&Datum::word("red"), false));
        assert!(ws.remprop("turtle", "color"));
        assert!(ws.gprop("turtle", "color").is_none());
    }
}
