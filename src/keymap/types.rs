//! Core types for the keymap system: Keystroke, Modifiers, KeyCode

use std::fmt;

/// Modifier keys as a bitfield for efficient storage and comparison
///
/// Being a bitfield, the set is order-independent by construction: `<C-A-s>`
/// and `<A-C-s>` produce the same value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    /// Map a notation prefix letter (`C`, `A`, `S`, `M`, either case) to its flag
    pub fn from_prefix(letter: char) -> Option<Modifiers> {
        match letter.to_ascii_uppercase() {
            'C' => Some(Modifiers::CTRL),
            'A' => Some(Modifiers::ALT),
            'S' => Some(Modifiers::SHIFT),
            'M' => Some(Modifiers::META),
            _ => None,
        }
    }

    /// Check if ctrl is held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    /// Check if alt/option is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    /// Check if meta (cmd/win) is held
    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Remove the modifiers in `other` from this set
    #[inline]
    pub const fn without(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & !other.0)
    }

    /// Prefix letters in canonical order: Ctrl, Alt, Shift, Meta
    fn prefixes(self) -> impl Iterator<Item = char> {
        [
            (self.ctrl(), 'C'),
            (self.alt(), 'A'),
            (self.shift(), 'S'),
            (self.meta(), 'M'),
        ]
        .into_iter()
        .filter_map(|(held, letter)| held.then_some(letter))
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Canonical notation prefix, e.g. `C-A-` for Ctrl+Alt
impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in self.prefixes() {
            write!(f, "{}-", letter)?;
        }
        Ok(())
    }
}

/// A key code representing a logical key
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    /// A character key, case-sensitive (`A` is shifted `a`)
    Char(char),

    // Named keys
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    // Arrow keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Function keys
    F(u8), // F1-F24

    /// Mouse buttons; 4 and 5 are the back/forward side buttons
    Mouse(u8),

    /// A key name the engine has no variant for, stored lower-cased
    Named(String),
}

impl KeyCode {
    /// Resolve a key name as written inside `<...>` (case-insensitive)
    ///
    /// Single characters come back as `Char` unchanged. Unknown names are kept
    /// as `Named` so hosts can bind keys this crate does not know about.
    pub fn from_name(name: &str) -> Option<KeyCode> {
        let mut chars = name.chars();
        let first = chars.next()?;
        if chars.next().is_none() {
            return Some(KeyCode::Char(first));
        }

        let lower = name.to_ascii_lowercase();
        let key = match lower.as_str() {
            "enter" | "cr" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Escape,
            "tab" => KeyCode::Tab,
            "bs" | "backspace" => KeyCode::Backspace,
            "del" | "delete" => KeyCode::Delete,
            "space" => KeyCode::Space,

            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,

            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "insert" => KeyCode::Insert,

            // Characters that would clash with the notation itself
            "lt" => KeyCode::Char('<'),
            "gt" => KeyCode::Char('>'),
            "bar" => KeyCode::Char('|'),
            "bslash" => KeyCode::Char('\\'),

            _ => numbered(&lower, "f", 1..=24)
                .map(KeyCode::F)
                .or_else(|| numbered(&lower, "mouse", 1..=9).map(KeyCode::Mouse))
                .unwrap_or(KeyCode::Named(lower)),
        };
        Some(key)
    }

    /// Whether this key needs `<...>` brackets when written in a sequence
    pub fn needs_brackets(&self) -> bool {
        !matches!(self, KeyCode::Char(c) if *c != '<')
    }
}

/// Parse `<prefix><n>` with `n` in range, e.g. `f12` or `mouse4`
fn numbered(name: &str, prefix: &str, range: std::ops::RangeInclusive<u8>) -> Option<u8> {
    let n: u8 = name.strip_prefix(prefix)?.parse().ok()?;
    range.contains(&n).then_some(n)
}

/// Key name as written in notation (without brackets or modifiers)
impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char('<') => write!(f, "lt"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Escape => write!(f, "Esc"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Backspace => write!(f, "BS"),
            KeyCode::Delete => write!(f, "Del"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::Mouse(n) => write!(f, "Mouse{}", n),
            KeyCode::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A single keystroke (chord): a key with modifiers
///
/// Always normalized: Shift is folded into character keys, so `<S-a>` and `A`
/// are the same keystroke. Use [`Keystroke::new`] to get that guarantee.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keystroke {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl Keystroke {
    /// Create a normalized keystroke
    pub fn new(key: KeyCode, mods: Modifiers) -> Self {
        match key {
            KeyCode::Char(' ') => Self {
                key: KeyCode::Space,
                mods,
            },
            KeyCode::Char(c) if mods.shift() => Self {
                key: KeyCode::Char(shifted(c)),
                mods: mods.without(Modifiers::SHIFT),
            },
            key => Self { key, mods },
        }
    }

    /// Create a keystroke with no modifiers
    pub fn key(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Create a keystroke with a character key
    pub fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Create a keystroke with a character and modifiers
    pub fn char_with_mods(c: char, mods: Modifiers) -> Self {
        Self::new(KeyCode::Char(c), mods)
    }

    /// Display the keystroke using platform-specific symbols
    pub fn display_string(&self) -> String {
        let mut parts = Vec::new();

        if cfg!(target_os = "macos") {
            // macOS uses symbols: ⌃ ⌥ ⌘
            if self.mods.ctrl() {
                parts.push("⌃");
            }
            if self.mods.alt() {
                parts.push("⌥");
            }
            if self.mods.shift() {
                parts.push("⇧");
            }
            if self.mods.meta() {
                parts.push("⌘");
            }
        } else {
            if self.mods.ctrl() {
                parts.push("Ctrl+");
            }
            if self.mods.alt() {
                parts.push("Alt+");
            }
            if self.mods.shift() {
                parts.push("Shift+");
            }
            if self.mods.meta() {
                parts.push("Win+");
            }
        }

        let key_str = match &self.key {
            KeyCode::Char(c) if !self.mods.is_empty() => c.to_uppercase().to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            other => other.to_string(),
        };

        format!("{}{}", parts.join(""), key_str)
    }
}

/// Shift applied to a character key: letters go upper case, everything else
/// already encodes the shift in the character itself
fn shifted(c: char) -> char {
    if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else {
        c
    }
}

/// Canonical notation, e.g. `l`, `<Tab>`, `<C-A-s>`
impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.is_empty() && !self.key.needs_brackets() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "<{}{}>", self.mods, self.key)
        }
    }
}
