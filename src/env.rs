//! Environment stack: lexical frames chained to a parent.
//!
//! Frame lookup order is: check this frame's bindings, then walk the
//! parent chain. Bindings within one frame have no observable order, so
//! a frame stores them in a `HashMap`; struct member order is tracked
//! separately in [`crate::value::StructInstance`], where order *is*
//! observable.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::EvalError;
use crate::value::Value;

/// A single lexical frame, parented on an optional outer frame.
#[derive(Debug)]
struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
}

/// A reference-counted handle to an environment frame.
///
/// Cloning an `Environment` clones the handle, not the frame: all clones
/// observe the same bindings. Evaluation is single-threaded, so a plain
/// `Rc<RefCell<_>>` is sufficient.
#[derive(Debug, Clone)]
pub struct Environment(Rc<std::cell::RefCell<Frame>>);

impl Environment {
    /// Creates a new root frame with no parent.
    pub fn new_root() -> Self {
        Environment(Rc::new(std::cell::RefCell::new(Frame {
            bindings: HashMap::new(),
            parent: None,
        })))
    }

    /// Creates a new frame parented on `self`.
    pub fn child(&self) -> Self {
        Environment(Rc::new(std::cell::RefCell::new(Frame {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Defines a new binding in this frame. Rebinding an existing name in
    /// the *same* frame is a duplicate-binding error; shadowing a name
    /// bound in a parent frame is allowed.
    pub fn define(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let mut frame = self.0.borrow_mut();
        if frame.bindings.contains_key(name) {
            return Err(EvalError::DuplicateBinding {
                name: name.to_string(),
            });
        }
        frame.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Resolves a name by checking this frame, then walking the parent
    /// chain.
    pub fn resolve(&self, name: &str) -> Result<Value, EvalError> {
        let frame = self.0.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Ok(value.clone());
        }
        match &frame.parent {
            Some(parent) => parent.resolve(name),
            None => Err(EvalError::UndefinedSymbol {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_resolve_round_trips() {
        let env = Environment::new_root();
        env.define("x", Value::Int(5)).unwrap();
        assert_eq!(env.resolve("x").unwrap().to_string(), "5");
    }

    #[test]
    fn duplicate_binding_in_same_frame_is_an_error() {
        let env = Environment::new_root();
        env.define("x", Value::Int(1)).unwrap();
        let err = env.define("x", Value::Int(2)).unwrap_err();
        assert!(matches!(err, EvalError::DuplicateBinding { .. }));
    }

    #[test]
    fn child_frame_resolves_through_parent() {
        let parent = Environment::new_root();
        parent.define("x", Value::Int(1)).unwrap();
        let child = parent.child();
        assert_eq!(child.resolve("x").unwrap().to_string(), "1");
    }

    #[test]
    fn child_frame_may_shadow_parent_binding() {
        let parent = Environment::new_root();
        parent.define("x", Value::Int(1)).unwrap();
        let child = parent.child();
        child.define("x", Value::Int(2)).unwrap();
        assert_eq!(child.resolve("x").unwrap().to_string(), "2");
        assert_eq!(parent.resolve("x").unwrap().to_string(), "1");
    }

    #[test]
    fn undefined_symbol_walks_full_chain_before_failing() {
        let parent = Environment::new_root();
        let child = parent.child();
        let err = child.resolve("missing").unwrap_err();
        assert!(matches!(err, EvalError::UndefinedSymbol { .. }));
    }
}
