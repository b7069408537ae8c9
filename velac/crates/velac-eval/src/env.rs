//! Persistent evaluation environments.
//!
//! An environment maps variable names to simplified expressions. It is a
//! linked list of immutable frames: binding returns a new environment
//! whose tail is shared with the old one, so extension never invalidates
//! an ancestor's view. Lookup walks outward and the innermost binding
//! shadows.

use std::rc::Rc;

use velac_util::Ident;

use crate::ir::SExpr;

/// An immutable environment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Env {
    head: Option<Rc<Frame>>,
}

#[derive(Debug, PartialEq)]
struct Frame {
    name: Ident,
    value: SExpr,
    parent: Env,
}

impl Env {
    /// The empty environment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A new environment with `name` bound to `value`, shadowing any outer
    /// binding of the same name.
    pub fn bind(&self, name: Ident, value: SExpr) -> Env {
        Env {
            head: Some(Rc::new(Frame {
                name,
                value,
                parent: self.clone(),
            })),
        }
    }

    /// Bind several names at once, leftmost outermost.
    pub fn bind_all<I>(&self, bindings: I) -> Env
    where
        I: IntoIterator<Item = (Ident, SExpr)>,
    {
        bindings
            .into_iter()
            .fold(self.clone(), |env, (name, value)| env.bind(name, value))
    }

    /// The innermost binding of `name`, if any.
    pub fn lookup(&self, name: Ident) -> Option<&SExpr> {
        let mut current = &self.head;
        while let Some(frame) = current {
            if frame.name == name {
                return Some(&frame.value);
            }
            current = &frame.parent.head;
        }
        None
    }

    /// Number of frames, for tests.
    pub fn depth(&self) -> usize {
        let mut n = 0;
        let mut current = &self.head;
        while let Some(frame) = current {
            n += 1;
            current = &frame.parent.head;
        }
        n
    }
}
