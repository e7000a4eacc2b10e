//! Key sequences and the bindings that map them to actions

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use super::parser::{parse_keystrokes, SequenceError};
use super::types::Keystroke;

/// A non-empty, normalized list of keystrokes
///
/// Length 1 is a simple binding, anything longer is a chord sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySequence(Vec<Keystroke>);

impl KeySequence {
    /// Build a sequence from already-normalized keystrokes
    pub fn new(keystrokes: Vec<Keystroke>) -> Result<Self, SequenceError> {
        if keystrokes.is_empty() {
            return Err(SequenceError::Empty);
        }
        Ok(Self(keystrokes))
    }

    /// A one-keystroke sequence
    pub fn single(keystroke: Keystroke) -> Self {
        Self(vec![keystroke])
    }

    /// Human-readable label, e.g. `Ctrl+W l`
    pub fn display_string(&self) -> String {
        self.0
            .iter()
            .map(|k| k.display_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for KeySequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_keystrokes(s).and_then(KeySequence::new)
    }
}

impl Deref for KeySequence {
    type Target = [Keystroke];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Lets tables keyed by `KeySequence` be queried with a pending `&[Keystroke]`
impl Borrow<[Keystroke]> for KeySequence {
    fn borrow(&self) -> &[Keystroke] {
        &self.0
    }
}

/// Canonical notation, e.g. `<C-w>l`
impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stroke in &self.0 {
            write!(f, "{}", stroke)?;
        }
        Ok(())
    }
}

/// A single keybinding mapping a key sequence to an action handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding<A> {
    /// The keystroke sequence (usually 1, sometimes more for chords)
    pub sequence: KeySequence,
    /// The action to fire
    pub action: A,
}

impl<A> Keybinding<A> {
    /// Create a single-keystroke binding
    pub fn new(keystroke: Keystroke, action: A) -> Self {
        Self {
            sequence: KeySequence::single(keystroke),
            action,
        }
    }

    /// Parse a binding from notation, e.g. `("<C-w>l", action)`
    pub fn parse(notation: &str, action: A) -> Result<Self, SequenceError> {
        Ok(Self {
            sequence: notation.parse()?,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::types::Modifiers;

    fn ctrl_w() -> Keystroke {
        Keystroke::char_with_mods('w', Modifiers::CTRL)
    }

    #[test]
    fn test_single_binding() {
        let binding = Keybinding::new(ctrl_w(), "close");

        assert_eq!(binding.sequence.len(), 1);
        assert_eq!(binding.sequence[0], ctrl_w());
        assert_eq!(binding.sequence, "<C-w>".parse().unwrap());
    }

    #[test]
    fn test_chord_binding() {
        let binding = Keybinding::parse("<C-w>l", "next-window").unwrap();

        assert_eq!(binding.sequence.len(), 2);
        assert!(binding.sequence.starts_with(&[ctrl_w()]));
        assert!(!binding.sequence.starts_with(&[Keystroke::char('l')]));
    }

    #[test]
    fn test_sequence_display_is_canonical() {
        let seq: KeySequence = "<A-C-s>x".parse().unwrap();
        assert_eq!(seq.to_string(), "<C-A-s>x");
    }

    #[test]
    fn test_empty_sequence_rejected() {
        assert_eq!(KeySequence::new(vec![]), Err(SequenceError::Empty));
        assert_eq!(
            KeySequence::new(vec![Keystroke::char('l')]),
            Ok(KeySequence::single(Keystroke::char('l')))
        );
        assert!("".parse::<KeySequence>().is_err());
    }

    #[test]
    fn test_display_string_joins_chords() {
        let seq: KeySequence = "<C-w>l".parse().unwrap();
        #[cfg(not(target_os = "macos"))]
        assert_eq!(seq.display_string(), "Ctrl+W l");
        #[cfg(target_os = "macos")]
        assert_eq!(seq.display_string(), "⌃W l");
    }
}
