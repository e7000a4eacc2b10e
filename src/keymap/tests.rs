//! Integration tests for the keymap system

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;

/// Embedded default keymap YAML for testing
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

fn stroke(notation: &str) -> Keystroke {
    parse_keystroke(notation).unwrap()
}

fn matcher_for(platform: Platform) -> SequenceMatcher<Command> {
    let table = default_keymap()
        .build_table(platform, MergePolicy::Strict)
        .unwrap();
    SequenceMatcher::new(Arc::new(table))
}

#[test]
fn test_embedded_yaml_parses() {
    let layers = parse_keymap_yaml(DEFAULT_KEYMAP_YAML)
        .expect("Embedded keymap.yaml should parse successfully");

    assert!(!layers.is_empty(), "Should have bindings");

    let has_interrupt = layers.base.iter().any(|b| b.action == Command::Interrupt);
    assert!(has_interrupt, "Should have Interrupt binding");

    for platform in Platform::ALL {
        assert!(
            !layers.platform(platform).is_empty(),
            "Should have overrides for {}",
            platform
        );
    }
}

#[test]
fn test_embedded_yaml_builds_strict_for_every_platform() {
    let layers = parse_keymap_yaml(DEFAULT_KEYMAP_YAML).unwrap();
    for platform in Platform::ALL {
        let table = layers.build_table(platform, MergePolicy::Strict);
        assert!(table.is_ok(), "{} table should build", platform);
    }
}

#[test]
fn test_load_default_keymap() {
    let layers = load_default_keymap(MergePolicy::LastWins);
    assert!(!layers.is_empty(), "Default keymap should not be empty");
}

#[test]
fn test_mac_bindings() {
    let mut matcher = matcher_for(Platform::Mac);
    let now = Instant::now();

    let cases = [
        ("<M-a>", Command::SelectAll),
        ("<M-]>", Command::Forward),
        ("<M-[>", Command::Back),
        ("<M-f>", Command::ToggleFind),
        ("<M-r>", Command::Refresh),
        ("<C-c>", Command::Interrupt),
        ("<Mouse4>", Command::Back),
        ("<Mouse5>", Command::Forward),
    ];
    for (key, expected) in cases {
        let outcome = matcher.handle_keystroke(stroke(key), now);
        assert_eq!(outcome.actions, vec![expected], "{}", key);
    }

    // Linux layout is not active on mac
    assert!(matcher.handle_keystroke(stroke("<C-f>"), now).is_no_match());
}

#[test]
fn test_linux_bindings() {
    let mut matcher = matcher_for(Platform::Linux);
    let now = Instant::now();

    let cases = [
        ("<C-]>", Command::Forward),
        ("<C-[>", Command::Back),
        ("<C-f>", Command::ToggleFind),
        ("<C-r>", Command::Refresh),
        ("<C-c>", Command::Interrupt),
    ];
    for (key, expected) in cases {
        let outcome = matcher.handle_keystroke(stroke(key), now);
        assert_eq!(outcome.actions, vec![expected], "{}", key);
    }

    assert!(matcher.handle_keystroke(stroke("<M-f>"), now).is_no_match());
}

#[test]
fn test_defaults_fire_without_waiting() {
    // No default binding is a prefix of another, so nothing ever waits
    let table = default_keymap()
        .build_table(Platform::Mac, MergePolicy::Strict)
        .unwrap();
    for (sequence, _) in table.bindings() {
        assert!(table.longest_prefix_is_unique(sequence), "{}", sequence);
    }
}

#[test]
fn test_host_events_drive_commands() {
    let mut matcher = matcher_for(Platform::Linux);
    let mut ctx = RecordingContext::new();
    let now = Instant::now();

    for (key, mods) in [
        ("Mouse4", Modifiers::NONE),
        ("f", Modifiers::CTRL),
        ("<Mouse5>", Modifiers::NONE),
        ("c", Modifiers::CTRL),
    ] {
        for command in matcher.handle_key_event(key, mods, now).actions {
            command.run(&mut ctx);
        }
    }

    assert_eq!(
        ctx.calls,
        vec![Call::Back, Call::ToggleFind, Call::Forward, Call::Interrupt]
    );
}

#[test]
fn test_window_chord_layered_on_defaults() {
    let user = parse_keymap_yaml(
        r#"
keybindings:
  "<C-w>": Refresh
  "<C-w>l": Forward
  "<C-w>h": Back
"#,
    )
    .unwrap();
    let table = default_keymap()
        .merge(user)
        .build_table(Platform::Linux, MergePolicy::Strict)
        .unwrap();
    let mut matcher = SequenceMatcher::with_timeout(Arc::new(table), Duration::from_millis(300));
    let t0 = Instant::now();

    let outcome = matcher.handle_keystroke(stroke("<C-w>"), t0);
    assert!(outcome.is_pending());
    let outcome = matcher.handle_keystroke(stroke("h"), t0 + Duration::from_millis(50));
    assert_eq!(outcome.actions, vec![Command::Back]);

    matcher.handle_keystroke(stroke("<C-w>"), t0 + Duration::from_millis(100));
    assert_eq!(matcher.poll(t0 + Duration::from_millis(400)), Some(Command::Refresh));
}

#[test]
fn test_closure_actions() {
    let table = BindingTable::<ActionFn>::build(
        [
            (
                "<C-w>l",
                Arc::new(|ctx: &mut dyn ActionContext| ctx.focused().forward()) as ActionFn,
            ),
            (
                "<C-c>",
                Arc::new(|ctx: &mut dyn ActionContext| ctx.interrupt()) as ActionFn,
            ),
        ],
        [],
        MergePolicy::Strict,
    )
    .unwrap();
    let mut matcher = SequenceMatcher::new(Arc::new(table));
    let mut ctx = RecordingContext::new();
    let now = Instant::now();

    for key in ["<C-w>", "l", "<C-c>"] {
        for action in matcher.handle_keystroke(stroke(key), now).actions {
            action(&mut ctx);
        }
    }

    assert_eq!(ctx.calls, vec![Call::Forward, Call::Interrupt]);
}
