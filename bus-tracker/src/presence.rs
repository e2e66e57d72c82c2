//! User presence signal and presence-gated ticking.
//!
//! The host reports whether the user is currently looking at the app
//! (foreground) through a [`Presence`]. Pollers use a
//! [`PresenceGatedTicker`] so that nothing is polled while the user is
//! away, and polling resumes immediately when they return.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Shared foreground/background state.
#[derive(Debug, Clone)]
pub struct Presence {
    tx: Arc<watch::Sender<bool>>,
}

impl Presence {
    /// Create a signal with the given initial state.
    pub fn new(present: bool) -> Self {
        let (tx, _rx) = watch::channel(present);
        Self { tx: Arc::new(tx) }
    }

    /// Report whether the user is present. Repeating the current state does
    /// not wake subscribers.
    pub fn set(&self, present: bool) {
        self.tx.send_if_modified(|current| {
            if *current == present {
                false
            } else {
                *current = present;
                true
            }
        });
    }

    /// The current state.
    pub fn is_present(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// A ticker firing every `interval` while present.
    pub fn ticker(&self, interval: Duration) -> PresenceGatedTicker {
        PresenceGatedTicker {
            interval,
            presence: self.subscribe(),
            next_at: None,
            _signal: self.clone(),
        }
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Interval ticker that pauses while the user is away.
///
/// - the first tick fires immediately if present;
/// - subsequent ticks fire `interval` after the previous tick returned;
/// - while absent, no tick fires no matter how much time passes;
/// - on becoming present again, a tick fires immediately rather than
///   waiting out the remainder of the interval.
#[derive(Debug)]
pub struct PresenceGatedTicker {
    interval: Duration,
    presence: watch::Receiver<bool>,
    next_at: Option<Instant>,
    // Keeps the sender alive so `changed()` never reports closure.
    _signal: Presence,
}

impl PresenceGatedTicker {
    /// Wait for the next tick.
    ///
    /// Returns `None` if the presence signal was dropped.
    pub async fn tick(&mut self) -> Option<()> {
        // `set` only notifies on a real change, so a change seen while
        // present means the user left and came back, possibly between
        // two calls.
        loop {
            let returned = self.presence.has_changed().ok()?;
            if !*self.presence.borrow_and_update() {
                self.next_at = None;
                self.presence.changed().await.ok()?;
                continue;
            }

            let Some(at) = self.next_at else {
                break;
            };
            if returned {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep_until(at) => break,
                changed = self.presence.changed() => {
                    changed.ok()?;
                    if *self.presence.borrow_and_update() {
                        break;
                    }
                }
            }
        }

        self.next_at = Some(Instant::now() + self.interval);
        Some(())
    }
}
