//! The Array variant of the Datum value model.

use std::cell::RefCell;
use std::rc::Rc;

use super::Datum;

struct Inner {
    items: RefCell<Vec<Datum>>,
    origin: i64,
}

/// A fixed-length indexed sequence of Datum references with a configurable
/// origin (default 1), shared by reference like every other aggregate.
#[derive(Clone)]
pub struct Array(Rc<Inner>);

impl Array {
    pub fn new(items: Vec<Datum>, origin: i64) -> Array {
        Array(Rc::new(Inner {
                    items: RefCell::new(items),
                    origin,
                }))
    }

    pub fn origin(&self) -> i64 {
        self.0.origin
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<Datum> {
        self.0.items.borrow().clone()
    }

    /// Is `index` (in the array's own origin-relative numbering) in bounds?
    pub fn index_in_range(&self, index: i64) -> bool {
        index >= self.0.origin && index < self.0.origin + self.len() as i64
    }

    pub fn item_at(&self, index: i64) -> Option<Datum> {
        if !self.index_in_range(index) {
            return None;
        }
        let zero_based = (index - self.0.origin) as usize;
        self.0.items.borrow().get(zero_based).cloned()
    }

    pub fn set_item(&self, index: i64, value: Datum) -> bool {
        if !self.index_in_range(index) {
            return false;
        }
        let zero_based = (index - self.0.origin) as usize;
        self.0.items.borrow_mut()[zero_based] = value;
        true
    }

    pub fn is_identical(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn equals(&self, other: &Array, ignore_case: bool) -> bool {
        if self.len() != other.len() || self.origin() != other.origin() {
            return false;
        }

        let a = self.0.items.borrow();
        let b = other.0.items.borrow();

        a.iter().zip(b.iter()).all(|(x, y)| x.equals(y, ignore_case))
    }

    /// Render per : always enclosed in `{...}`, with `@origin`
    /// appended when the origin is not 1.
    pub fn print_value(&self, full: bool, depth_limit: i64, width_limit: i64) -> String {
        if depth_limit == 0 {
            return "...".to_string();
        }

        let inner_depth = if depth_limit > 0 { depth_limit - 1 } else { -1 };
        let items = self.0.items.borrow();

        let rendered: Vec<String> = items
        .iter()
        .map(|item| item.render(full, inner_depth, width_limit, false))
        .collect();

        let mut out = format!("{{{}}}", rendered.join(" "));
        if self.0.origin != 1 {
            out.push('@');
            out.push_str(&self.0.origin.to_string());
        }
        out
    }
}
