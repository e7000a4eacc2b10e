//! Key sequence notation parser
//!
//! Grammar (Neovim-style):
//!
//! ```text
//! sequence := chord+
//! chord    := <any char except '<'>
//!           | '<' (MOD '-')* KEY '>'
//! MOD      := 'C' | 'A' | 'S' | 'M'      (either case, any order)
//! KEY      := a single character or a key name (Tab, Enter, Mouse4, lt, ...)
//!             never containing '<'
//! ```
//!
//! `<C-w>l` is two chords: Ctrl+W followed by a bare `l`. Host key events are
//! normalized through the same rules in [`Keystroke::from_key_event`].

use thiserror::Error;

use super::types::{KeyCode, Keystroke, Modifiers};

/// Why a sequence string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("empty key sequence")]
    Empty,
    #[error("unterminated chord starting at byte {0}")]
    Unterminated(usize),
    #[error("unrecognized modifier prefix '{0}-'")]
    UnknownModifier(char),
    #[error("expected a single chord, found {0}")]
    MultipleChords(usize),
}

/// Parse a full sequence string into normalized keystrokes
pub fn parse_keystrokes(input: &str) -> Result<Vec<Keystroke>, SequenceError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    if chars.is_empty() {
        return Err(SequenceError::Empty);
    }

    let mut strokes = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        if c == '<' {
            let (stroke, next) = parse_bracketed(&chars, i + 1)
                .ok_or(SequenceError::Unterminated(offset))?;
            strokes.push(stroke?);
            i = next;
        } else {
            strokes.push(Keystroke::char(c));
            i += 1;
        }
    }

    Ok(strokes)
}

/// Parse exactly one chord, e.g. `<C-A-s>` or `x`
pub fn parse_keystroke(input: &str) -> Result<Keystroke, SequenceError> {
    let mut strokes = parse_keystrokes(input)?;
    match strokes.len() {
        1 => Ok(strokes.remove(0)),
        n => Err(SequenceError::MultipleChords(n)),
    }
}

/// Parse the inside of a `<...>` chord starting just after the `<`
///
/// Returns `None` when no closing `>` exists, otherwise the keystroke (or a
/// modifier error) and the index just past the `>`.
fn parse_bracketed(
    chars: &[(usize, char)],
    start: usize,
) -> Option<(Result<Keystroke, SequenceError>, usize)> {
    let mut i = start;
    let mut mods = Modifiers::NONE;

    // `X-` pairs are modifiers as long as something follows the dash
    while i + 2 < chars.len() && chars[i + 1].1 == '-' && chars[i].1.is_alphabetic() {
        let letter = chars[i].1;
        match Modifiers::from_prefix(letter) {
            Some(flag) => mods |= flag,
            None => {
                let close = find_close(chars, i + 2)?;
                return Some((Err(SequenceError::UnknownModifier(letter)), close + 1));
            }
        }
        i += 2;
    }

    // The first key character is taken as-is so `<C->>` and `<C-->` work.
    // A `<` is never part of a key name; it is written `<lt>`.
    let key_start = i;
    if chars.get(key_start)?.1 == '<' {
        return None;
    }
    let close = find_close(chars, key_start + 1)?;
    let name: String = chars[key_start..close].iter().map(|(_, c)| *c).collect();
    let key = KeyCode::from_name(&name)?;

    Some((Ok(Keystroke::new(key, mods)), close + 1))
}

/// Index of the `>` closing the current chord; `None` if another chord opens first
fn find_close(chars: &[(usize, char)], from: usize) -> Option<usize> {
    let j = (from..chars.len()).find(|&j| matches!(chars[j].1, '<' | '>'))?;
    (chars[j].1 == '>').then_some(j)
}

impl Keystroke {
    /// Normalize a raw host key event
    ///
    /// `key` is the host's key identifier: a character (`"a"`), a key name
    /// (`"Tab"`, `"Mouse4"`), or a bracketed chord (`"<Tab>"`, `"<C-w>"`).
    /// Modifiers from a bracketed identifier are combined with `mods`.
    /// Returns `None` for identifiers that cannot name a key.
    pub fn from_key_event(key: &str, mods: Modifiers) -> Option<Keystroke> {
        if key.len() > 1 && key.starts_with('<') {
            let stroke = parse_keystroke(key).ok()?;
            return Some(Keystroke::new(stroke.key, stroke.mods | mods));
        }
        let code = KeyCode::from_name(key)?;
        Some(Keystroke::new(code, mods))
    }
}
