//! Window focus signal.
//!
//! Focus changes feed analytics attribution (actions taken while unfocused
//! are "away" actions) and the catch-up notification when focus returns. The
//! coordinator drives the publisher from per-page `document.hasFocus()`
//! probes; any other source can push through it as well.

use tokio::sync::watch;

/// Publisher half of the focus signal.
#[derive(Debug)]
pub struct FocusSignal {
    tx: watch::Sender<bool>,
}

impl FocusSignal {
    /// Create the signal. The window starts focused; the agent only counts
    /// actions as away once an explicit blur arrives.
    pub fn new() -> Self {
        Self {
            tx: watch::channel(true).0,
        }
    }

    /// Subscribe to focus transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn set_focused(&self, focused: bool) {
        // send_replace never fails; receivers may be gone during shutdown.
        self.tx.send_replace(focused);
    }

    pub fn is_focused(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for FocusSignal {
    fn default() -> Self {
        Self::new()
    }
}
