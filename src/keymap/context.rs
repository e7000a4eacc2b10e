//! Capabilities an action can use when it fires
//!
//! Actions never see concrete UI types. The host implements these traits for
//! whatever it renders with (a browser view, a terminal pane) and passes itself
//! to [`Command::run`](super::Command::run) or to a bound callback.

use std::sync::Arc;

/// Content that can be navigated like a browser page
pub trait Navigable {
    fn back(&mut self);
    fn forward(&mut self);
    fn refresh(&mut self);
    fn select_all(&mut self);
    /// Show or hide the find bar and move focus to it
    fn toggle_find(&mut self);
}

/// Everything an action is handed when it fires
pub trait ActionContext {
    /// The view/content that currently has focus
    fn focused(&mut self) -> &mut dyn Navigable;

    /// Ask the host to interrupt itself (e.g. raise SIGINT)
    fn interrupt(&mut self);
}

/// A bound callback, for hosts that bind closures instead of [`Command`](super::Command)s
pub type ActionFn = Arc<dyn Fn(&mut dyn ActionContext) + Send + Sync>;

/// Calls recorded by [`RecordingContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Back,
    Forward,
    Refresh,
    SelectAll,
    ToggleFind,
    Interrupt,
}

/// An action context that just records what was asked of it
///
/// Used by the `replay` command and by tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    pub calls: Vec<Call>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain recorded calls
    pub fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl Navigable for RecordingContext {
    fn back(&mut self) {
        self.calls.push(Call::Back);
    }

    fn forward(&mut self) {
        self.calls.push(Call::Forward);
    }

    fn refresh(&mut self) {
        self.calls.push(Call::Refresh);
    }

    fn select_all(&mut self) {
        self.calls.push(Call::SelectAll);
    }

    fn toggle_find(&mut self) {
        self.calls.push(Call::ToggleFind);
    }
}

impl ActionContext for RecordingContext {
    fn focused(&mut self) -> &mut dyn Navigable {
        self
    }

    fn interrupt(&mut self) {
        self.calls.push(Call::Interrupt);
    }
}
