use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use super::Node;

/// Nodes that may carry a name, which is what references are resolved against.
pub trait PossiblyNamed {
    fn name(&self) -> Option<&str>;
}

/// A link to a node elsewhere in the tree, written down by name and resolved later.
///
/// The target is held weakly: a reference never keeps its target alive, and the target is not a child of the node
/// holding the reference.
pub struct ReferenceByName<T> {
    pub name: String,
    referred: RefCell<Option<Weak<T>>>,
}

impl<T: Node> ReferenceByName<T> {
    pub fn new(name: impl Into<String>) -> ReferenceByName<T> {
        ReferenceByName { name: name.into(), referred: RefCell::new(None) }
    }

    pub fn resolved_to(name: impl Into<String>, target: &Rc<T>) -> ReferenceByName<T> {
        let reference = ReferenceByName::new(name);
        reference.resolve(target);
        reference
    }

    /// The target, if resolved and still alive.
    pub fn referred(&self) -> Option<Rc<T>> {
        self.referred.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn is_resolved(&self) -> bool {
        self.referred().is_some()
    }

    pub fn resolve(&self, target: &Rc<T>) {
        *self.referred.borrow_mut() = Some(Rc::downgrade(target));
    }

    /// Resolves against the first candidate whose name matches. Returns whether a match was found; on failure any
    /// previous resolution is cleared.
    pub fn try_to_resolve<'a>(&self, candidates: impl IntoIterator<Item = &'a Rc<T>>, case_insensitive: bool) -> bool
    where
        T: PossiblyNamed,
    {
        let matches = |candidate: &str| {
            if case_insensitive {
                candidate.eq_ignore_ascii_case(&self.name)
            } else {
                candidate == self.name
            }
        };

        let found = candidates.into_iter().find(|candidate| candidate.name().is_some_and(matches));

        *self.referred.borrow_mut() = found.map(Rc::downgrade);
        found.is_some()
    }
}

impl<T> Clone for ReferenceByName<T> {
    fn clone(&self) -> Self {
        ReferenceByName { name: self.name.clone(), referred: RefCell::new(self.referred.borrow().clone()) }
    }
}

impl<T> Debug for ReferenceByName<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let solved = self.referred.borrow().as_ref().is_some_and(|weak| weak.strong_count() > 0);
        write!(f, "Ref({})[{}]", self.name, if solved { "Solved" } else { "Unsolved" })
    }
}
