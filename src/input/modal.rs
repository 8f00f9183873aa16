//! Confirm/cancel gate in front of irreversible actions.

/// A confirmation waiting for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirm<A> {
    /// What the modal names, e.g. the feed title.
    pub subject: String,
    pub action: A,
}

/// Holds at most one pending confirmation. Opening a new one silently
/// discards the previous action; it is never run.
#[derive(Debug)]
pub struct ModalCoordinator<A> {
    pending: Option<PendingConfirm<A>>,
}

impl<A> Default for ModalCoordinator<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> ModalCoordinator<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingConfirm<A>> {
        self.pending.as_ref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.subject.as_str())
    }

    /// Show the modal for `subject`, holding `action` until confirmed.
    pub fn open(&mut self, subject: impl Into<String>, action: A) {
        let subject = subject.into();
        if let Some(previous) = self.pending.take() {
            tracing::debug!(previous = %previous.subject, subject = %subject, "Replacing open confirmation");
        }
        self.pending = Some(PendingConfirm { subject, action });
    }

    /// Close the modal and hand back the held action, exactly once.
    pub fn confirm(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.action)
    }

    /// Cancel control or click outside the modal body: discard the action.
    /// Returns true if a modal was open.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
