//! Refresh token: a counter that says "the loan list may be stale".
//!
//! The coordinating [`LoanApp`](crate::LoanApp) owns the [`RefreshToken`]. The
//! payment form gets a [`RefreshTrigger`] (the only way to bump from outside
//! the owner), the list view gets a [`RefreshReader`] (read and subscribe only).
//!
//! Listeners run synchronously inside [`RefreshToken::bump`], after the new
//! value is visible, so anything a listener starts is ordered after the bump.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

type Listener = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Default)]
struct Inner {
    value: u64,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Handle returned by `subscribe`, used to remove the listener again.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a Subscription leaves the listener registered with no way to remove it"]
pub struct Subscription {
    id: u64,
}

#[derive(Clone, Default)]
struct Shared {
    inner: Arc<RwLock<Inner>>,
}

impl Shared {
    fn current(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .value
    }

    fn bump(&self) -> u64 {
        let (value, listeners) = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.value += 1;
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (inner.value, listeners)
        };
        debug!(token = value, listeners = listeners.len(), "refresh token bumped");
        // Lock is released so listeners may read the token or unsubscribe.
        for listener in listeners {
            listener(value);
        }
        value
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription { id }
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = inner.listeners.len();
        inner.listeners.retain(|(id, _)| *id != subscription.id);
        inner.listeners.len() != before
    }

    fn listener_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

/// Owner of the refresh token. Starts at 0.
#[derive(Default)]
pub struct RefreshToken {
    shared: Shared,
}

impl RefreshToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by exactly one and notify every subscriber with the new value.
    pub fn bump(&self) -> u64 {
        self.shared.bump()
    }

    pub fn current(&self) -> u64 {
        self.shared.current()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.shared.subscribe(listener)
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.shared.unsubscribe(subscription)
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listener_count()
    }

    /// Read-only handle for observers.
    pub fn reader(&self) -> RefreshReader {
        RefreshReader {
            shared: self.shared.clone(),
        }
    }

    /// Write handle for the single component allowed to signal a change.
    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            shared: self.shared.clone(),
        }
    }
}

/// Observer side of the token: read the value, subscribe to changes.
#[derive(Clone)]
pub struct RefreshReader {
    shared: Shared,
}

impl RefreshReader {
    pub fn current(&self) -> u64 {
        self.shared.current()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.shared.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.shared.unsubscribe(subscription)
    }
}

/// Writer side of the token, handed to the payment form.
#[derive(Clone)]
pub struct RefreshTrigger {
    shared: Shared,
}

impl RefreshTrigger {
    pub fn bump(&self) -> u64 {
        self.shared.bump()
    }

    pub fn current(&self) -> u64 {
        self.shared.current()
    }
}
