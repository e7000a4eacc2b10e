//! Default keybindings
//!
//! The defaults ship as `keymap.yaml` compiled into the binary, with a
//! hardcoded copy as fallback. A user keymap is layered on top.

use std::path::Path;

use super::binding::Keybinding;
use super::command::Command;
use super::config::{load_keymap_file, parse_keymap_yaml, KeymapError, KeymapLayers};
use super::platform::Platform;
use super::table::MergePolicy;
use super::types::{KeyCode, Keystroke, Modifiers};

/// Default keymap YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Get the embedded default keymap source
pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Load and merge keymaps: defaults + user overrides
///
/// Loading order (each layer overrides the previous):
/// 1. Embedded default keymap (compiled into binary)
/// 2. User config at ~/.config/chordmap/keymap.yaml
///
/// A broken user keymap is logged and skipped, including one that repeats a
/// sequence within a layer under [`MergePolicy::Strict`].
pub fn load_default_keymap(policy: MergePolicy) -> KeymapLayers {
    let layers = embedded_keymap();

    let Some(user_path) = crate::config_paths::keymap_file() else {
        return layers;
    };
    if !user_path.exists() {
        return layers;
    }

    let user = load_keymap_file(&user_path).and_then(|user| {
        user.check_duplicates(policy)?;
        Ok(user)
    });
    match user {
        Ok(user) => {
            tracing::info!(
                "Merging user keymap from {} ({} bindings)",
                user_path.display(),
                user.len()
            );
            layers.merge(user)
        }
        Err(e) => {
            tracing::warn!("Failed to load user keymap from {}: {}", user_path.display(), e);
            layers
        }
    }
}

/// Defaults plus an explicitly named keymap file
///
/// Unlike the implicit user keymap, errors in an explicit file are returned.
/// Duplicates within one of its layers are judged by `policy` before merging.
pub fn load_keymap_with(path: &Path, policy: MergePolicy) -> Result<KeymapLayers, KeymapError> {
    let user = load_keymap_file(path)?;
    user.check_duplicates(policy)?;
    tracing::info!(
        "Merging keymap from {} ({} bindings)",
        path.display(),
        user.len()
    );
    Ok(embedded_keymap().merge(user))
}

fn embedded_keymap() -> KeymapLayers {
    match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(layers) => {
            tracing::info!("Loaded embedded default keymap ({} bindings)", layers.len());
            layers
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded keymap: {}, using hardcoded defaults",
                e
            );
            default_keymap()
        }
    }
}

/// Merge user bindings into base bindings
///
/// User bindings override or extend base bindings:
/// - If user binding has the same sequence → replaces base
/// - If user binding command is `Unbound` → removes matching base bindings
/// - Otherwise → user binding is added
pub fn merge_bindings(
    base: Vec<Keybinding<Command>>,
    user: Vec<Keybinding<Command>>,
) -> Vec<Keybinding<Command>> {
    let mut result = base;

    for user_binding in user {
        if user_binding.action == Command::Unbound {
            result.retain(|b| b.sequence != user_binding.sequence);
            continue;
        }

        match result
            .iter()
            .position(|b| b.sequence == user_binding.sequence)
        {
            Some(idx) => result[idx] = user_binding,
            None => result.push(user_binding),
        }
    }

    result
}

/// Hardcoded copy of the embedded keymap
pub fn default_keymap() -> KeymapLayers {
    let none = Modifiers::NONE;
    let ctrl = Modifiers::CTRL;
    let meta = Modifiers::META;

    let base = vec![
        bind(KeyCode::Char('c'), ctrl, Command::Interrupt),
        bind(KeyCode::Mouse(4), none, Command::Back),
        bind(KeyCode::Mouse(5), none, Command::Forward),
    ];

    let mac = vec![
        bind(KeyCode::Char('a'), meta, Command::SelectAll),
        bind(KeyCode::Char(']'), meta, Command::Forward),
        bind(KeyCode::Char('['), meta, Command::Back),
        bind(KeyCode::Char('f'), meta, Command::ToggleFind),
        bind(KeyCode::Char('r'), meta, Command::Refresh),
    ];

    // Linux and Windows share the Ctrl-based layout
    let ctrl_layout = vec![
        bind(KeyCode::Char(']'), ctrl, Command::Forward),
        bind(KeyCode::Char('['), ctrl, Command::Back),
        bind(KeyCode::Char('f'), ctrl, Command::ToggleFind),
        bind(KeyCode::Char('r'), ctrl, Command::Refresh),
    ];

    KeymapLayers {
        base,
        platforms: [
            (Platform::Mac, mac),
            (Platform::Linux, ctrl_layout.clone()),
            (Platform::Windows, ctrl_layout),
        ]
        .into_iter()
        .collect(),
    }
}

fn bind(key: KeyCode, mods: Modifiers, command: Command) -> Keybinding<Command> {
    Keybinding::new(Keystroke::new(key, mods), command)
}
