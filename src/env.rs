//! Module defining the lexical environment chain.

use crate::{Identifier, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A shared, mutable environment frame.
pub type EnvRef = Rc<RefCell<Env>>;

/// One frame of the lexical environment: a name→value map plus a pointer to
/// the enclosing frame.
///
/// Lookup walks outward; writes update the innermost frame that defines the
/// name; `define` always creates in the current frame. Closures hold the
/// frame chain itself — plain closures the live chain, `@`-dynamic closures a
/// [`snapshot`][Env::snapshot] taken at definition time.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<Identifier, Value, ahash::RandomState>,
    outer: Option<EnvRef>,
}

impl Env {
    /// A fresh root frame.
    #[must_use]
    pub fn new_ref() -> EnvRef {
        Rc::new(RefCell::new(Self::default()))
    }

    /// A fresh frame chained onto `outer`.
    #[must_use]
    pub fn with_outer(outer: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self {
            vars: HashMap::default(),
            outer: Some(outer),
        }))
    }

    /// Read a name, walking the chain outward. `None` means the name is not
    /// defined anywhere; the evaluator turns that into a runtime `Error`.
    #[must_use]
    pub fn read(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|o| o.borrow().read(name))
    }

    /// Update the innermost frame that defines `name`. Returns `false` when
    /// no frame does.
    pub fn write(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.vars.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.outer {
            Some(outer) => outer.borrow_mut().write(name, value),
            None => false,
        }
    }

    /// Create (or overwrite) a binding in the current frame.
    pub fn define(&mut self, name: impl Into<Identifier>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Number of bindings in this frame alone.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Is this frame empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate the bindings of this frame alone.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Value)> {
        self.vars.iter()
    }

    /// Deep-copy the frame chain. The copied frames share the *values* (which
    /// are cheaply shared anyway) but later writes through either chain do
    /// not affect the other.
    #[must_use]
    pub fn snapshot(env: &EnvRef) -> EnvRef {
        let inner = env.borrow();
        let outer = inner.outer.as_ref().map(Env::snapshot);
        Rc::new(RefCell::new(Env {
            vars: inner.vars.clone(),
            outer,
        }))
    }
}
