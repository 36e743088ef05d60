//! Cancellable execution scopes.
//!
//! A [`Scope`] represents a unit of cancellable work. Child scopes are
//! derived from a parent with [`Scope::child`]; cancelling a parent cancels
//! every child, while cancelling a child leaves the parent untouched.
//!
//! Cancellation is cooperative. Producers poll [`Scope::is_cancelled`] or
//! await [`Scope::cancelled`] and unwind on their own; nothing here stops a
//! running thread.
//!
//! # Example
//!
//! ```
//! use limitstream::Scope;
//!
//! let root = Scope::new();
//! let (child, release) = root.child();
//!
//! assert!(!child.is_cancelled());
//! drop(release);
//! assert!(child.is_cancelled());
//! assert!(!root.is_cancelled());
//! ```

use tokio_util::sync::CancellationToken;

/// A cancellable unit of work.
///
/// Cloning a scope yields another handle to the same scope.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    token: CancellationToken,
}

impl Scope {
    /// Create a root scope.
    pub fn new() -> Self {
        Scope {
            token: CancellationToken::new(),
        }
    }

    /// Derive a cancellable child scope.
    ///
    /// The returned guard releases the child when dropped, so holding it for
    /// the duration of the operation guarantees release on every exit path.
    pub fn child(&self) -> (Scope, ReleaseGuard) {
        let child = Scope {
            token: self.token.child_token(),
        };
        let guard = ReleaseGuard {
            scope: child.clone(),
            armed: true,
        };
        (child, guard)
    }

    /// Cancel this scope and every scope derived from it.
    ///
    /// Idempotent: safe to call any number of times from any thread.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether this scope, or one of its ancestors, has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the scope is cancelled.
    ///
    /// ```
    /// use limitstream::Scope;
    ///
    /// # tokio_test::block_on(async {
    /// let scope = Scope::new();
    /// scope.cancel();
    /// scope.cancelled().await;
    /// # });
    /// ```
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// The underlying token, for integrating with code that already speaks
    /// `tokio_util` cancellation.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for Scope {
    fn from(token: CancellationToken) -> Self {
        Scope { token }
    }
}

/// Releases a child scope when dropped.
///
/// Returned by [`Scope::child`] and [`with_limit`](crate::with_limit).
/// Releasing cancels the child scope, freeing anything tied to it; it is
/// required whether or not a limit fired.
#[derive(Debug)]
#[must_use = "dropping the guard releases the scope immediately"]
pub struct ReleaseGuard {
    scope: Scope,
    armed: bool,
}

impl ReleaseGuard {
    /// Release the scope now.
    pub fn release(mut self) {
        self.release_inner();
    }

    /// Give up the guard without releasing, returning the scope.
    pub fn disarm(mut self) -> Scope {
        self.armed = false;
        self.scope.clone()
    }

    fn release_inner(&mut self) {
        if std::mem::take(&mut self.armed) {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                already_cancelled = self.scope.is_cancelled(),
                "releasing scope"
            );
            self.scope.cancel();
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let scope = Scope::new();
        scope.cancel();
        scope.cancel();
        assert!(scope.is_cancelled());
    }

    #[test]
    fn test_parent_cancel_reaches_child() {
        let root = Scope::new();
        let (child, _release) = root.child();
        let (grandchild, _release2) = child.child();

        root.cancel();

        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let root = Scope::new();
        let (child, _release) = root.child();

        child.cancel();

        assert!(child.is_cancelled());
        assert!(!root.is_cancelled());
    }

    #[test]
    fn test_explicit_release() {
        let root = Scope::new();
        let (child, release) = root.child();

        release.release();

        assert!(child.is_cancelled());
    }

    #[test]
    fn test_release_after_cancel_is_harmless() {
        let (child, release) = Scope::new().child();
        child.cancel();
        drop(release);
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_disarm_keeps_scope_alive() {
        let (child, release) = Scope::new().child();

        let handle = release.disarm();

        assert!(!child.is_cancelled());
        handle.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_release_on_panic_path() {
        let (child, release) = Scope::new().child();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _release = release;
            panic!("producer failed");
        }));

        assert!(outcome.is_err());
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_wakes_waiter() {
        let scope = Scope::new();
        let waiter = scope.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            true
        });

        scope.cancel();

        assert!(handle.await.unwrap());
    }
}
