//! Sequence matcher: resolves keystrokes one at a time against a binding table
//!
//! ```text
//!            keystroke                    exact, nothing longer
//!   Idle ───────────────► lookup ───────────────────────────────► fire, Idle
//!    ▲                      │ prefix, or exact but extendable
//!    │                      ▼
//!    │   timeout       Awaiting ── keystroke ──► lookup (buffer + key)
//!    └──────────────── (timer armed)
//! ```
//!
//! The matcher owns no thread or runtime. Arming the timeout yields a
//! [`TimerToken`]; the host either schedules a one-shot callback that calls
//! [`SequenceMatcher::handle_timeout`] with the token, or waits until
//! [`SequenceMatcher::deadline`] and calls [`SequenceMatcher::poll`]. Every
//! keystroke cancels the armed timer before it is processed, so a key event
//! delivered before the timeout handler runs always wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::table::{BindingTable, Lookup};
use super::types::{Keystroke, Modifiers};

/// Default time to wait for the next key of an ambiguous or partial sequence
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Identifies one armed timeout
///
/// Tokens from a superseded or cancelled timeout never match the current
/// one, so late deliveries are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    generation: u64,
    deadline: Instant,
}

impl TimerToken {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Matcher state between key events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchState {
    /// No pending input
    Idle,
    /// Keystrokes typed so far (a strict prefix of at least one binding, or an
    /// ambiguous exact match) and the timeout that resolves them
    Awaiting {
        pending: Vec<Keystroke>,
        timer: TimerToken,
    },
}

/// What a key event resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<A> {
    /// Actions to fire, in order
    ///
    /// Usually zero or one. Two when the key broke an ambiguous match (which
    /// fires) and was itself bound.
    pub actions: Vec<A>,
    /// Set while more input is awaited; the host should schedule this timeout
    pub timer: Option<TimerToken>,
}

impl<A> Outcome<A> {
    /// Nothing fired and nothing pending
    pub fn is_no_match(&self) -> bool {
        self.actions.is_empty() && self.timer.is_none()
    }

    /// Waiting for more keys
    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }
}

/// Stateful resolver for one input focus
///
/// Tables are shared; each focus gets its own matcher.
#[derive(Debug)]
pub struct SequenceMatcher<A> {
    table: Arc<BindingTable<A>>,
    timeout: Duration,
    state: MatchState,
    generation: u64,
}

impl<A: Clone> SequenceMatcher<A> {
    pub fn new(table: Arc<BindingTable<A>>) -> Self {
        Self::with_timeout(table, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(table: Arc<BindingTable<A>>, timeout: Duration) -> Self {
        Self {
            table,
            timeout,
            state: MatchState::Idle,
            generation: 0,
        }
    }

    pub fn table(&self) -> &BindingTable<A> {
        &self.table
    }

    /// Swap in a new table (e.g. after a keymap reload); drops pending input
    pub fn set_table(&mut self, table: Arc<BindingTable<A>>) {
        self.reset();
        self.table = table;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the timeout; applies from the next armed timer
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Check if any chord is in progress
    pub fn has_pending_chord(&self) -> bool {
        matches!(self.state, MatchState::Awaiting { .. })
    }

    /// Keystrokes buffered in the current attempt
    pub fn pending(&self) -> &[Keystroke] {
        match &self.state {
            MatchState::Idle => &[],
            MatchState::Awaiting { pending, .. } => pending,
        }
    }

    /// Get the pending chord keystrokes (for status bar display)
    pub fn pending_display(&self) -> Option<String> {
        let pending = self.pending();
        if pending.is_empty() {
            None
        } else {
            Some(
                pending
                    .iter()
                    .map(|k| k.display_string())
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
    }

    /// When the armed timeout is due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.armed().map(|t| t.deadline)
    }

    /// Handle a raw host key event
    ///
    /// Identifiers that cannot name a key act like an unbound key: they end
    /// any pending attempt and never fire on their own.
    pub fn handle_key_event(&mut self, key: &str, mods: Modifiers, now: Instant) -> Outcome<A> {
        match Keystroke::from_key_event(key, mods) {
            Some(keystroke) => self.handle_keystroke(keystroke, now),
            None => {
                tracing::debug!(key, "Unrecognized key event");
                Outcome {
                    actions: self.abandon().into_iter().collect(),
                    timer: None,
                }
            }
        }
    }

    /// Handle a normalized keystroke
    pub fn handle_keystroke(&mut self, keystroke: Keystroke, now: Instant) -> Outcome<A> {
        // Taking the state cancels whatever timer was armed
        let mut pending = match std::mem::replace(&mut self.state, MatchState::Idle) {
            MatchState::Idle => Vec::new(),
            MatchState::Awaiting { pending, .. } => pending,
        };
        pending.push(keystroke);

        let mut actions = Vec::new();
        self.resolve(pending, now, &mut actions);

        Outcome {
            actions,
            timer: self.armed(),
        }
    }

    /// Resolve a buffer; the matcher must be idle on entry
    fn resolve(&mut self, mut pending: Vec<Keystroke>, now: Instant, actions: &mut Vec<A>) {
        let table = Arc::clone(&self.table);

        match table.lookup(&pending) {
            Lookup::Exact(action) if table.longest_prefix_is_unique(&pending) => {
                tracing::debug!(sequence = %Self::notation(&pending), "Exact match");
                actions.push(action.clone());
            }
            Lookup::Exact(_) | Lookup::Prefix => self.arm(pending, now),
            Lookup::NoMatch => {
                let Some(last) = pending.pop() else {
                    return;
                };
                if pending.is_empty() {
                    tracing::trace!(key = %last, "Unbound key");
                    return;
                }

                // The new key breaks the chain: an ambiguous match fires now,
                // then the key gets a fresh attempt on its own
                tracing::debug!(
                    pending = %Self::notation(&pending),
                    key = %last,
                    "Sequence broken"
                );
                if let Some(action) = table.get(&pending) {
                    actions.push(action.clone());
                }
                self.resolve(vec![last], now, actions);
            }
        }
    }

    /// Deliver a scheduled timeout
    ///
    /// Ignored unless `token` is the currently armed timer. Returns the action
    /// of an ambiguous exact match; a pending prefix that times out is dropped.
    pub fn handle_timeout(&mut self, token: TimerToken) -> Option<A> {
        if self.armed() != Some(token) {
            tracing::trace!(generation = token.generation, "Stale timeout ignored");
            return None;
        }
        self.expire()
    }

    /// Fire the armed timeout if it is due at `now`
    pub fn poll(&mut self, now: Instant) -> Option<A> {
        match self.armed() {
            Some(timer) if now >= timer.deadline => self.expire(),
            _ => None,
        }
    }

    /// Drop pending input and cancel the timer; safe to call at any time
    pub fn reset(&mut self) {
        if self.has_pending_chord() {
            tracing::debug!(pending = %Self::notation(self.pending()), "Sequence reset");
        }
        self.state = MatchState::Idle;
    }

    fn armed(&self) -> Option<TimerToken> {
        match &self.state {
            MatchState::Idle => None,
            MatchState::Awaiting { timer, .. } => Some(*timer),
        }
    }

    fn arm(&mut self, pending: Vec<Keystroke>, now: Instant) {
        self.generation += 1;
        let timer = TimerToken {
            generation: self.generation,
            deadline: now + self.timeout,
        };
        tracing::debug!(
            pending = %Self::notation(&pending),
            generation = timer.generation,
            "Awaiting more input"
        );
        self.state = MatchState::Awaiting { pending, timer };
    }

    fn expire(&mut self) -> Option<A> {
        let action = self.abandon();
        match &action {
            Some(_) => tracing::debug!("Timeout fired pending exact match"),
            None => tracing::debug!("Timeout dropped pending prefix"),
        }
        action
    }

    /// Go idle, returning the pending buffer's action if it is bound exactly
    fn abandon(&mut self) -> Option<A> {
        match std::mem::replace(&mut self.state, MatchState::Idle) {
            MatchState::Idle => None,
            MatchState::Awaiting { pending, .. } => self.table.get(&pending).cloned(),
        }
    }

    fn notation(keystrokes: &[Keystroke]) -> String {
        keystrokes.iter().map(|k| k.to_string()).collect()
    }
}
