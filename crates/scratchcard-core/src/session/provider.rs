use std::cell::RefCell;
use std::rc::Rc;

use super::store::SessionStore;

thread_local! {
    static PROVIDED: RefCell<Vec<Rc<SessionStore>>> = const { RefCell::new(Vec::new()) };
}

/// Makes a store reachable through [`use_session`] while a closure runs.
///
/// Scopes nest: the innermost provider wins, and the outer one is visible
/// again once the inner scope exits (also on panic).
#[derive(Debug, Clone)]
pub struct SessionProvider {
    store: Rc<SessionStore>,
}

impl SessionProvider {
    pub fn new(store: Rc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Rc<SessionStore> {
        &self.store
    }

    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        PROVIDED.with(|p| p.borrow_mut().push(Rc::clone(&self.store)));
        let _guard = ScopeGuard;
        f()
    }
}

struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        PROVIDED.with(|p| {
            p.borrow_mut().pop();
        });
    }
}

/// The store of the innermost enclosing [`SessionProvider`].
///
/// # Panics
///
/// Panics when called outside any provider scope. That is a wiring bug,
/// not a runtime condition.
pub fn use_session() -> Rc<SessionStore> {
    try_use_session().expect("use_session must be used within a SessionProvider")
}

pub fn try_use_session() -> Option<Rc<SessionStore>> {
    PROVIDED.with(|p| p.borrow().last().cloned())
}
