//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use chordmap::keymap::{
    parse_keystroke, BindingTable, Command, MergePolicy, Outcome, SequenceMatcher,
};

pub const TIMEOUT: Duration = Duration::from_millis(1000);

/// Bindings used by most tests: an ambiguous `<C-w>` plus window chords
pub const WINDOW_BINDINGS: &[(&str, Command)] = &[
    ("<C-w>", Command::Refresh),
    ("<C-w>l", Command::Forward),
    ("<C-w>h", Command::Back),
    ("<C-c>", Command::Interrupt),
];

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Build a strict table from notation/command pairs
pub fn table(entries: &[(&str, Command)]) -> Arc<BindingTable<Command>> {
    Arc::new(BindingTable::build(entries.iter().copied(), [], MergePolicy::Strict).unwrap())
}

pub fn matcher(entries: &[(&str, Command)]) -> SequenceMatcher<Command> {
    SequenceMatcher::with_timeout(table(entries), TIMEOUT)
}

/// Press a key given in notation at `at`
pub fn press(m: &mut SequenceMatcher<Command>, key: &str, at: Instant) -> Outcome<Command> {
    m.handle_keystroke(parse_keystroke(key).unwrap(), at)
}
