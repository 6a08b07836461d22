//! The List variant of the Datum value model.
//!
//! Lists are singly-linked cons cells shared by reference; sublists (tails)
//! may be shared between distinct top-level lists, and user code is allowed
//! to build self-referencing cycles via `.SETFIRST`/`.SETBF`. A List also
//! carries the runparse/parse memoization described in §4.3/§4.4: a single
//! timestamp guards both a cached runparsed token list and a cached parsed
//! AST, and is reset to 0 whenever the cell is mutated.

use std::cell::RefCell;
use std::rc::Rc;

use super::ast::AstNode;
use super::Datum;

thread_local! {
    // Cells currently being rendered somewhere up the call stack of the
    // current top-level PRINT/SHOW. `bounded_items_for_display`'s own `seen`
    // vector only catches a cycle in one list's own rest-spine (`.SETBF`
    // looping back on itself); a `.SETFIRST` aliasing an ancestor list as an
    // *element* value instead recurses through a fresh `Datum::render` call
    // with no memory of the outer call, so that case needs this separate,
    // cross-call guard.
    static PRINT_ANCESTORS: RefCell<Vec<*const Cell>> = RefCell::new(Vec::new());
}

struct Cell {
    first: RefCell<Datum>,
    rest: RefCell<List>,
    len: std::cell::Cell<usize>,
    parse_timestamp: std::cell::Cell<u64>,
    runparse_cache: RefCell<Option<List>>,
    ast_cache: RefCell<Option<Rc<Vec<AstNode>>>>,
}

/// A Logo list. The empty list has no backing cell and is therefore always
/// considered identical to any other empty list, matching the canonical-nil
/// convention of Lisp-family languages.
#[derive(Clone)]
pub struct List(Option<Rc<Cell>>);

impl List {
    pub fn empty() -> List {
        List(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn cons(first: Datum, rest: List) -> List {
        let len = rest.len() + 1;
        List(Some(Rc::new(Cell {
                        first: RefCell::new(first),
                        rest: RefCell::new(rest),
                        len: std::cell::Cell::new(len),
                        parse_timestamp: std::cell::Cell::new(0),
                        runparse_cache: RefCell::new(None),
                        ast_cache: RefCell::new(None),
                    })))
    }

    pub fn from_vec(items: Vec<Datum>) -> List {
        let mut result = List::empty();
        for item in items.into_iter().rev() {
            result = List::cons(item, result);
        }
        result
    }

    pub fn to_vec(&self) -> Vec<Datum> {
        let mut out = Vec::with_capacity(self.len());
        let mut cur = self.clone();
        // Cycle guard: a well-formed acyclic list never exceeds its own
        // reported length, so bound the walk by it plus one.
        let bound = self.len().saturating_add(1);
        for _ in 0..bound {
            match cur.0 {
                None => break,
                Some(ref cell) => {
                    out.push(cell.first.borrow().clone());
                    let next = cell.rest.borrow().clone();
                    cur = next;
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        match &self.0 {
            None => 0,
            Some(cell) => cell.len.get(),
        }
    }

    pub fn first(&self) -> Option<Datum> {
        self.0.as_ref().map(|cell| cell.first.borrow().clone())
    }

    pub fn rest(&self) -> List {
        match &self.0 {
            None => List::empty(),
            Some(cell) => cell.rest.borrow().clone(),
        }
    }

    /// `.SETFIRST` — mutate the head of this (non-empty) cell in place.
    /// Invalidates this cell's parse cache. Tolerates the new value aliasing
    /// `self`, creating a cycle.
    pub fn set_first(&self, value: Datum) -> bool {
        match &self.0 {
            None => false,
            Some(cell) => {
                *cell.first.borrow_mut() = value;
                cell.parse_timestamp.set(0);
                true
            }
        }
    }

    /// `.SETBF` — mutate the tail of this (non-empty) cell in place,
    /// recomputing the cached length. Tolerates cycles.
    pub fn set_butfirst(&self, new_rest: List) -> bool {
        match &self.0 {
            None => false,
            Some(cell) => {
                // The new tail's length may itself be unknowable if it forms
                // a cycle back through `self`; in that case we keep the
                // existing length estimate rather than looping forever.
                let new_rest_len = if new_rest.contains_cell(cell) {
                    cell.len.get().saturating_sub(1)
                } else {
                    new_rest.len()
                };

                *cell.rest.borrow_mut() = new_rest;
                cell.len.set(new_rest_len + 1);
                cell.parse_timestamp.set(0);
                true
            }
        }
    }

    /// `.SETITEM` — mutate the nth (1-based) element in place.
    pub fn set_item(&self, index: usize, value: Datum) -> bool {
        let mut cur = self.clone();
        let mut i = 1;
        loop {
            match &cur.0 {
                None => return false,
                Some(cell) => {
                    if i == index {
                        *cell.first.borrow_mut() = value;
                        cell.parse_timestamp.set(0);
                        return true;
                    }
                    let next = cell.rest.borrow().clone();
                    cur = next;
                    i += 1;
                }
            }
        }
    }

    fn contains_cell(&self, target: &Cell) -> bool {
        let mut cur = self.clone();
        let bound = self.len().saturating_add(2);
        for _ in 0..bound {
            match &cur.0 {
                None => return false,
                Some(cell) => {
                    if std::ptr::eq(cell.as_ref(), target) {
                        return true;
                    }
                    let next = cell.rest.borrow().clone();
                    cur = next;
                }
            }
        }
        // Bound exceeded: this only happens if `self` is itself cyclic and
        // never reaches `target`; treat as "does not contain".
        false
    }

    pub fn is_identical(&self, other: &List) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural equality, descending into sublists. Bounded by the
    /// reported length of `self` so a cyclic list compares without looping
    /// forever (mirrors the cycle tolerance required for printing).
    pub fn equals(&self, other: &List, ignore_case: bool) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let mut a = self.clone();
        let mut b = other.clone();
        let bound = self.len();

        for _ in 0..bound {
            match (a.first(), b.first()) {
                (Some(x), Some(y)) => {
                    if !x.equals(&y, ignore_case) {
                        return false;
                    }
                }
                (None, None) => break,
                _ => return false,
            }
            a = a.rest();
            b = b.rest();
        }

        true
    }

    /// Identity used as the cache key for runparse/parse memoization:
    /// `None` for the empty list (which is never cached against, since it
    /// has nothing to parse).
    fn cell(&self) -> Option<&Rc<Cell>> {
        self.0.as_ref()
    }

    /// Valid as long as nothing has bumped the global mutation counter since
    /// this cache was stored: `stored_timestamp >= current_timestamp`. A
    /// `.SETFIRST`/`.SETBF`/`.SETITEM` on this cell resets `parse_timestamp`
    /// to 0, which invalidates against any non-zero counter value.
    pub fn cached_runparse(&self, current_timestamp: u64) -> Option<List> {
        let cell = self.cell()?;
        if cell.parse_timestamp.get() >= current_timestamp {
            return cell.runparse_cache.borrow().clone();
        }
        None
    }

    pub fn cached_ast(&self, current_timestamp: u64) -> Option<Rc<Vec<AstNode>>> {
        let cell = self.cell()?;
        if cell.parse_timestamp.get() >= current_timestamp {
            return cell.ast_cache.borrow().clone();
        }
        None
    }

    pub fn store_runparse_cache(&self, timestamp: u64, tokens: List) {
        if let Some(cell) = self.cell() {
            cell.parse_timestamp.set(timestamp);
            *cell.runparse_cache.borrow_mut() = Some(tokens);
        }
    }

    pub fn store_ast_cache(&self, timestamp: u64, ast: Rc<Vec<AstNode>>) {
        if let Some(cell) = self.cell() {
            cell.parse_timestamp.set(timestamp);
            *cell.ast_cache.borrow_mut() = Some(ast);
        }
    }

    /// Render per List rendering rules. `top_level` suppresses
    /// the enclosing `[...]` the way PRINT (but not SHOW) does.
    pub fn print_value(
        &self,
        full: bool,
        depth_limit: i64,
        width_limit: i64,
        top_level: bool,
    ) -> String {
        if depth_limit == 0 {
            return "...".to_string();
        }

        let cell_ptr = self.0.as_ref().map(|cell| cell.as_ref() as *const Cell);
        if let Some(ptr) = cell_ptr {
            let already_printing = PRINT_ANCESTORS.with(|stack| stack.borrow().contains(&ptr));
            if already_printing {
                return "...".to_string();
            }
            PRINT_ANCESTORS.with(|stack| stack.borrow_mut().push(ptr));
        }
        let result = self.print_value_inner(full, depth_limit, width_limit, top_level);
        if cell_ptr.is_some() {
            PRINT_ANCESTORS.with(|stack| stack.borrow_mut().pop());
        }
        result
    }

    fn print_value_inner(
        &self,
        full: bool,
        depth_limit: i64,
        width_limit: i64,
        top_level: bool,
    ) -> String {
        let items = self.bounded_items_for_display();
        let inner_depth = if depth_limit > 0 { depth_limit - 1 } else { -1 };

        let rendered: Vec<String> = items
        .iter()
        .map(|item| item.render(full, inner_depth, width_limit, false))
        .collect();

        let body = rendered.join(" ");

        if top_level {
            body
        } else {
            format!("[{}]", body)
        }
    }

    /// Collect elements for display, substituting `...` for the remainder
    /// once a cycle back to an already-visited cell is detected.
    fn bounded_items_for_display(&self) -> Vec<DisplayItem> {
        let mut out = Vec::new();
        let mut seen: Vec<*const Cell> = Vec::new();
        let mut cur = self.clone();

        loop {
            match &cur.0 {
                None => break,
                Some(cell) => {
                    let ptr = cell.as_ref() as *const Cell;
                    if seen.contains(&ptr) {
                        out.push(DisplayItem::Ellipsis);
                        break;
                    }
                    seen.push(ptr);
                    out.push(DisplayItem::Value(cell.first.borrow().clone()));
                    let next = cell.rest.borrow().clone();
                    cur = next;
                }
            }
        }

        out
    }
}

enum DisplayItem {
    Value(Datum),
    Ellipsis,
}

impl DisplayItem {
    fn render(&self, full: bool, depth: i64, width: i64, top_level: bool) -> String {
        match self {
            DisplayItem::Value(d) => d.render(full, depth, width, top_level),
            DisplayItem::Ellipsis => "...".to_string(),
        }
    }
}

impl Default for List {
    fn default() -> Self {
        List::empty()
    }
}
