//! Key sequence resolution
//!
//! This module provides a data-driven keybinding system that:
//! - Parses Neovim-style notation (`<C-w>l`, `<A-C-s>`, `<Mouse4>`)
//! - Normalizes modifier order so permutations name the same chord
//! - Merges a base keymap with one platform override table
//! - Resolves multi-key sequences, using a timeout to decide between a binding
//!   and a longer binding it is a prefix of
//!
//! # Architecture
//!
//! ```text
//! host key event → Keystroke → SequenceMatcher → BindingTable::lookup() → Outcome { actions }
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! let layers = load_default_keymap(MergePolicy::LastWins);
//! let table = Arc::new(layers.build_table(Platform::current(), MergePolicy::LastWins)?);
//! let mut matcher = SequenceMatcher::new(table);
//! ```

mod binding;
mod command;
mod config;
mod context;
mod defaults;
mod matcher;
mod parser;
mod platform;
mod table;
mod types;

pub use binding::{KeySequence, Keybinding};
pub use command::Command;
pub use config::{load_keymap_file, parse_keymap_yaml, KeymapConfig, KeymapError, KeymapLayers};
pub use context::{ActionContext, ActionFn, Call, Navigable, RecordingContext};
pub use defaults::{
    default_keymap, get_default_keymap_yaml, load_default_keymap, load_keymap_with,
    merge_bindings,
};
pub use matcher::{MatchState, Outcome, SequenceMatcher, TimerToken, DEFAULT_TIMEOUT};
pub use parser::{parse_keystroke, parse_keystrokes, SequenceError};
pub use platform::Platform;
pub use table::{BindingTable, Lookup, MergePolicy};
pub use types::{KeyCode, Keystroke, Modifiers};

#[cfg(test)]
mod tests;
