//! Endpoint lifecycle states.

/// Lifecycle of a frame handler.
///
/// `Open` is entered at most once. An error reported before the endpoint
/// opened moves it straight to `Errored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum LifecycleState {
    /// Constructed, `on_open` has not completed yet.
    #[default]
    Uninitialized,
    /// Session created and open handler succeeded.
    Open,
    /// The transport reported the connection closed.
    Closed,
    /// An error was reported for the connection.
    Errored,
}

impl LifecycleState {
    /// Returns `true` only for `Open`.
    #[must_use]
    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self, LifecycleState::Open)
    }

    /// Returns `true` for `Closed` and `Errored`.
    #[must_use]
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Closed | LifecycleState::Errored)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "Uninitialized"),
            LifecycleState::Open => write!(f, "Open"),
            LifecycleState::Closed => write!(f, "Closed"),
            LifecycleState::Errored => write!(f, "Errored"),
        }
    }
}
