//! YAML configuration parsing for keymaps
//!
//! A keymap file maps sequence notation to command names. Nested maps named
//! after a platform hold that platform's overrides:
//!
//! ```yaml
//! keybindings:
//!   "<C-c>": Interrupt
//!   "<Mouse4>": Back
//!   mac:
//!     "<M-f>": ToggleFind
//!   linux:
//!     "<C-f>": ToggleFind
//! ```
//!
//! Whether an entry is a binding or a platform table is decided by its value,
//! so a binding on the literal keys `mac` still works.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use super::binding::Keybinding;
use super::command::Command;
use super::defaults::merge_bindings;
use super::parser::SequenceError;
use super::platform::Platform;
use super::table::{check_layer, BindingTable, MergePolicy};

/// Root structure of a keymap YAML file
#[derive(Debug, Default, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub keybindings: Mapping,
}

/// Parsed keymap: a base layer plus per-platform override layers
///
/// Entries keep file order so later duplicates win deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeymapLayers {
    pub base: Vec<Keybinding<Command>>,
    pub platforms: HashMap<Platform, Vec<Keybinding<Command>>>,
}

impl KeymapLayers {
    /// Override layer for a platform (empty when the file has none)
    pub fn platform(&self, platform: Platform) -> &[Keybinding<Command>] {
        self.platforms
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of entries across all layers
    pub fn len(&self) -> usize {
        self.base.len() + self.platforms.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply the duplicate policy to every layer as written
    ///
    /// Run this on a freshly parsed file, before [`merge`](Self::merge) folds
    /// same-layer duplicates into one entry.
    pub fn check_duplicates(&self, policy: MergePolicy) -> Result<(), KeymapError> {
        check_layer(&self.base, policy)?;
        let mut platforms: Vec<_> = self.platforms.iter().collect();
        platforms.sort_by_key(|(platform, _)| platform.as_str());
        for (_, layer) in platforms {
            check_layer(layer, policy)?;
        }
        Ok(())
    }

    /// Layer `user` on top of `self`, base over base and platform over platform
    ///
    /// A user `Unbound` entry removes the sequence from every lower layer it
    /// applies to. Platform-level `Unbound` entries are kept so that building
    /// the table also strips the base binding for that platform only.
    pub fn merge(mut self, user: KeymapLayers) -> KeymapLayers {
        let unbound_in_base: Vec<_> = user
            .base
            .iter()
            .filter(|b| b.action == Command::Unbound)
            .map(|b| b.sequence.clone())
            .collect();
        for layer in self.platforms.values_mut() {
            layer.retain(|b| !unbound_in_base.contains(&b.sequence));
        }

        self.base = merge_bindings(self.base, user.base);

        for (platform, user_layer) in user.platforms {
            let unbinds: Vec<_> = user_layer
                .iter()
                .filter(|b| b.action == Command::Unbound)
                .cloned()
                .collect();
            let lower = self.platforms.remove(&platform).unwrap_or_default();
            let mut merged = merge_bindings(lower, user_layer);
            merged.extend(unbinds);
            self.platforms.insert(platform, merged);
        }

        self
    }

    /// Build the binding table for one platform
    pub fn build_table(
        &self,
        platform: Platform,
        policy: MergePolicy,
    ) -> Result<BindingTable<Command>, KeymapError> {
        let overrides = self.platform(platform);
        let unbound: Vec<_> = overrides
            .iter()
            .filter(|b| b.action == Command::Unbound)
            .map(|b| &b.sequence)
            .collect();

        let base = self
            .base
            .iter()
            .filter(|b| b.action != Command::Unbound && !unbound.contains(&&b.sequence))
            .cloned()
            .collect();
        let overrides = overrides
            .iter()
            .filter(|b| b.action != Command::Unbound)
            .cloned()
            .collect();

        BindingTable::from_layers(base, overrides, policy)
    }
}

/// Load keybindings from a YAML file
pub fn load_keymap_file(path: &Path) -> Result<KeymapLayers, KeymapError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| KeymapError::IoError(format!("{}: {}", path.display(), e)))?;

    parse_keymap_yaml(&content)
}

/// Parse keybindings from YAML string
pub fn parse_keymap_yaml(yaml: &str) -> Result<KeymapLayers, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    let mut layers = KeymapLayers::default();

    for (key, value) in config.keybindings {
        let key = expect_string(key, "keybinding key")?;
        match value {
            Value::Mapping(sub) => {
                let platform = key
                    .parse::<Platform>()
                    .map_err(|_| KeymapError::InvalidPlatform(key.clone()))?;
                let layer = layers.platforms.entry(platform).or_default();
                for (key, value) in sub {
                    let notation = expect_string(key, "keybinding key")?;
                    let command = expect_string(value, &notation)?;
                    layer.push(parse_binding(&notation, &command)?);
                }
            }
            value => {
                let command = expect_string(value, &key)?;
                layers.base.push(parse_binding(&key, &command)?);
            }
        }
    }

    Ok(layers)
}

fn parse_binding(notation: &str, command: &str) -> Result<Keybinding<Command>, KeymapError> {
    let command: Command = command
        .parse()
        .map_err(|_| KeymapError::InvalidCommand(command.to_string()))?;

    Keybinding::parse(notation, command).map_err(|reason| KeymapError::MalformedSequence {
        sequence: notation.to_string(),
        reason,
    })
}

fn expect_string(value: Value, what: &str) -> Result<String, KeymapError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(KeymapError::ParseError(format!(
            "expected a string for {}, found {:?}",
            what, other
        ))),
    }
}

/// Errors that can occur when parsing keymaps
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Malformed key sequence {sequence:?}: {reason}")]
    MalformedSequence {
        sequence: String,
        #[source]
        reason: SequenceError,
    },
    #[error("Duplicate binding: {0}")]
    DuplicateBinding(String),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::parser::parse_keystrokes;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
keybindings:
  "<C-c>": Interrupt
  "<Mouse4>": Back
"#;

        let layers = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(layers.base.len(), 2);
        assert_eq!(layers.base[0].action, Command::Interrupt);
        assert_eq!(layers.base[1].action, Command::Back);
        assert!(layers.platforms.is_empty());
    }

    #[test]
    fn test_parse_yaml_with_platforms() {
        let yaml = r#"
keybindings:
  "<C-c>": Interrupt
  mac:
    "<M-f>": ToggleFind
    "<M-r>": Refresh
  linux:
    "<C-f>": ToggleFind
"#;

        let layers = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(layers.base.len(), 1);
        assert_eq!(layers.platform(Platform::Mac).len(), 2);
        assert_eq!(layers.platform(Platform::Linux).len(), 1);
        assert!(layers.platform(Platform::Windows).is_empty());
        assert_eq!(layers.len(), 4);
    }

    #[test]
    fn test_literal_platform_name_as_binding() {
        let yaml = r#"
keybindings:
  mac: Refresh
"#;
        let layers = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(layers.base.len(), 1);
        assert_eq!(layers.base[0].sequence.len(), 3);
    }

    #[test]
    fn test_empty_file_is_empty_keymap() {
        let layers = parse_keymap_yaml("{}").unwrap();
        assert!(layers.is_empty());
    }

    #[test]
    fn test_malformed_sequence_reports_string() {
        let yaml = r#"
keybindings:
  "<C-": Interrupt
"#;
        let err = parse_keymap_yaml(yaml).unwrap_err();
        assert!(matches!(
            &err,
            KeymapError::MalformedSequence { sequence, .. } if sequence == "<C-"
        ));
        assert!(err.to_string().contains("<C-"));
    }

    #[test]
    fn test_unknown_command() {
        let yaml = r#"
keybindings:
  "<C-c>": LaunchRockets
"#;
        assert_eq!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::InvalidCommand("LaunchRockets".to_string()))
        );
    }

    #[test]
    fn test_unknown_platform() {
        let yaml = r#"
keybindings:
  amiga:
    "<C-c>": Interrupt
"#;
        assert_eq!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::InvalidPlatform("amiga".to_string()))
        );
    }

    #[test]
    fn test_non_string_value() {
        let yaml = r#"
keybindings:
  "<C-c>": 42
"#;
        assert!(matches!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::ParseError(_))
        ));
    }

    #[test]
    fn test_build_table_per_platform() {
        let yaml = r#"
keybindings:
  "<M-f>": Back
  mac:
    "<M-f>": ToggleFind
"#;
        let layers = parse_keymap_yaml(yaml).unwrap();
        let seq = parse_keystrokes("<M-f>").unwrap();

        let mac = layers.build_table(Platform::Mac, MergePolicy::Strict).unwrap();
        assert_eq!(mac.get(&seq), Some(&Command::ToggleFind));

        let linux = layers.build_table(Platform::Linux, MergePolicy::Strict).unwrap();
        assert_eq!(linux.get(&seq), Some(&Command::Back));
    }

    #[test]
    fn test_platform_unbound_strips_base_for_that_platform() {
        let yaml = r#"
keybindings:
  "<C-c>": Interrupt
  mac:
    "<C-c>": Unbound
"#;
        let layers = parse_keymap_yaml(yaml).unwrap();
        let seq = parse_keystrokes("<C-c>").unwrap();

        let mac = layers.build_table(Platform::Mac, MergePolicy::LastWins).unwrap();
        assert!(mac.get(&seq).is_none());

        let linux = layers.build_table(Platform::Linux, MergePolicy::LastWins).unwrap();
        assert_eq!(linux.get(&seq), Some(&Command::Interrupt));
    }

    #[test]
    fn test_merge_layers() {
        let defaults = parse_keymap_yaml(
            r#"
keybindings:
  "<C-c>": Interrupt
  "<Mouse4>": Back
  linux:
    "<C-r>": Refresh
    "<C-f>": ToggleFind
"#,
        )
        .unwrap();
        let user = parse_keymap_yaml(
            r#"
keybindings:
  "<Mouse4>": Forward
  "<C-f>": Unbound
  linux:
    "<C-r>": Back
"#,
        )
        .unwrap();

        let table = defaults
            .merge(user)
            .build_table(Platform::Linux, MergePolicy::Strict)
            .unwrap();

        let get = |s: &str| table.get(&parse_keystrokes(s).unwrap()).copied();
        assert_eq!(get("<Mouse4>"), Some(Command::Forward));
        assert_eq!(get("<C-c>"), Some(Command::Interrupt));
        assert_eq!(get("<C-r>"), Some(Command::Back));
        // Base-level Unbound also removes the lower platform layer's binding
        assert_eq!(get("<C-f>"), None);
    }
}
