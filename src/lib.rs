//! chordmap - key sequence resolution
//!
//! Maps Neovim-style key notation to actions and resolves multi-key sequences
//! as keystrokes arrive, with a timeout for sequences that are also prefixes.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod keymap;
pub mod tracing;

// Re-export commonly used types
pub use config::EngineConfig;
pub use keymap::{BindingTable, Command, KeySequence, Keystroke, Lookup, Modifiers, SequenceMatcher};
