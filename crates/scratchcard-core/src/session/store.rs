use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::state::{SessionSnapshot, SessionState};
use crate::error::SessionError;
use crate::models::User;
use crate::storage::{KeyValueStorage, TOKEN_KEY, USER_KEY};

/// Handle returned by [`SessionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&SessionSnapshot)>;

/// Single source of truth for the logged-in user and bearer token.
///
/// The user and token are written to durable storage under the `user` and
/// `token` keys and restored once by [`SessionStore::restore`]. Every
/// mutation notifies subscribers synchronously, in subscription order,
/// before it returns.
///
/// The store is single-threaded (`!Send`); share it with `Rc`.
pub struct SessionStore {
    storage: Box<dyn KeyValueStorage>,
    state: RefCell<SessionSnapshot>,
    restored: Cell<bool>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: Cell<u64>,
    watch_tx: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    /// Create a store that has not yet restored from storage
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        let (watch_tx, _) = watch::channel(SessionSnapshot::loading());
        Self {
            storage: Box::new(storage),
            state: RefCell::new(SessionSnapshot::loading()),
            restored: Cell::new(false),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
            watch_tx,
        }
    }

    /// Create a store and restore any cached session
    pub fn open(storage: impl KeyValueStorage + 'static) -> Self {
        let store = Self::new(storage);
        store.restore();
        store
    }

    /// Restore the session from storage.
    ///
    /// Runs once per store; later calls do nothing, and any mutation runs it
    /// first. A cached user that fails to parse is treated as corrupt: both
    /// keys are purged and the session stays anonymous. Nothing is reported
    /// to the caller, and `is_loading` is cleared on every path.
    pub fn restore(&self) {
        if self.restored.replace(true) {
            return;
        }

        let token = self.read_key(TOKEN_KEY);
        let cached_user = self.read_key(USER_KEY);

        match (token, cached_user) {
            (Some(token), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    debug!(user_id = %user.id, "Session restored from storage");
                    let mut state = self.state.borrow_mut();
                    state.user = Some(user);
                    state.token = Some(token);
                }
                Err(e) => {
                    warn!(error = %e, "Cached user is corrupt, clearing session");
                    self.purge();
                }
            },
            _ => debug!("No cached session"),
        }

        self.state.borrow_mut().is_loading = false;
        self.notify();
    }

    /// Adopt a freshly authenticated user and token.
    ///
    /// Memory is updated and subscribers notified even if the storage
    /// write fails; the write error is returned.
    pub fn login(&self, user: User, token: impl Into<String>) -> Result<(), SessionError> {
        self.restore();
        let token = token.into();
        let serialized = serde_json::to_string(&user)?;
        debug!(user_id = %user.id, "Logging in");

        {
            let mut state = self.state.borrow_mut();
            state.user = Some(user);
            state.token = Some(token.clone());
        }

        let persisted = self
            .storage
            .set(TOKEN_KEY, &token)
            .and_then(|_| self.storage.set(USER_KEY, &serialized));
        self.notify();
        Ok(persisted?)
    }

    /// Forget the current session. Safe to call when already logged out.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.restore();
        debug!("Logging out");
        {
            let mut state = self.state.borrow_mut();
            state.user = None;
            state.token = None;
        }

        let removed = self
            .storage
            .remove(TOKEN_KEY)
            .and_then(|_| self.storage.remove(USER_KEY));
        self.notify();
        Ok(removed?)
    }

    /// Replace the cached user without touching the token, e.g. after a
    /// balance or counter change.
    ///
    /// Ignored when nobody is logged in; the user and token are only ever
    /// set together.
    pub fn update_user(&self, user: User) -> Result<(), SessionError> {
        self.restore();
        if self.state.borrow().token.is_none() {
            warn!(user_id = %user.id, "Ignoring user update without an active session");
            return Ok(());
        }

        let serialized = serde_json::to_string(&user)?;
        debug!(user_id = %user.id, "Updating cached user");

        self.state.borrow_mut().user = Some(user);

        let persisted = self.storage.set(USER_KEY, &serialized);
        self.notify();
        Ok(persisted?)
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Register a callback invoked with the new snapshot after every change
    pub fn subscribe(&self, callback: impl Fn(&SessionSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Channel view of the session; its value is replaced on every change
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.watch_tx.subscribe()
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session storage");
                None
            }
        }
    }

    fn purge(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove corrupt session entry");
            }
        }
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        self.watch_tx.send_replace(snapshot.clone());

        // Callbacks may read the store or (un)subscribe, so no borrow is
        // held while they run.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in subscribers {
            callback(&snapshot);
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("state", &state.state())
            .field("user_id", &state.user.as_ref().map(|u| u.id.as_str()))
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}
