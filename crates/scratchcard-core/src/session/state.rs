use crate::models::User;

/// Where a session is in its lifecycle.
///
/// A store starts `Uninitialized` and moves to one of the two terminal
/// states when restoration finishes. `login` and `logout` move between
/// the terminal states; nothing returns to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Authenticated,
    Anonymous,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "Uninitialized"),
            SessionState::Authenticated => write!(f, "Authenticated"),
            SessionState::Anonymous => write!(f, "Anonymous"),
        }
    }
}

/// Point-in-time copy of the session, handed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    /// Snapshot of a store that has not restored yet
    pub fn loading() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.is_loading {
            SessionState::Uninitialized
        } else if self.user.is_some() && self.token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_loading_snapshot_is_uninitialized() {
        let snapshot = SessionSnapshot::loading();
        assert_eq!(snapshot.state(), SessionState::Uninitialized);
        assert!(!snapshot.is_authenticated());
    }

    #[test]
    fn test_state_from_fields() {
        let mut snapshot = SessionSnapshot::loading();
        snapshot.is_loading = false;
        assert_eq!(snapshot.state(), SessionState::Anonymous);

        snapshot.user = Some(fixtures::user("u1"));
        snapshot.token = Some("tok".to_string());
        assert_eq!(snapshot.state(), SessionState::Authenticated);
        assert_eq!(snapshot.state().to_string(), "Authenticated");
    }
}
