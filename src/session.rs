//! Per-context authentication state.
//!
//! A `Session` is a plain value owned by whatever drives the core (the
//! interactive front end, a test, a future per-connection handler). It holds
//! at most one authenticated username, is never persisted, and carries no
//! process-wide state, so contexts can be multiplied freely.

/// Tracks which account, if any, is authenticated for one interactive
/// context.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current: Option<String>,
}

impl Session {
    /// A fresh, unauthenticated session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns the authenticated username, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Returns `true` if an account is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Binds this session to an account. Set only by a successful login.
    pub(crate) fn bind(&mut self, username: &str) {
        self.current = Some(username.to_string());
    }

    /// Clears any authenticated account. Idempotent.
    pub(crate) fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session_has_no_account() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert_eq!(session.current(), None);
    }

    #[test]
    fn test_bind_and_clear() {
        let mut session = Session::anonymous();
        session.bind("alice");
        assert!(session.is_authenticated());
        assert_eq!(session.current(), Some("alice"));

        session.clear();
        assert!(!session.is_authenticated());

        // clear is idempotent
        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_rebind_replaces_account() {
        let mut session = Session::anonymous();
        session.bind("alice");
        session.bind("bob");
        assert_eq!(session.current(), Some("bob"));
    }
}
