//! Command-line argument parsing and the replay driver
//!
//! Supports:
//! - `check`: validate a keymap and list the effective bindings
//! - `replay`: feed a scripted key sequence through a matcher on a virtual clock

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use crate::config::EngineConfig;
use crate::keymap::{
    parse_keystrokes, Command, Keystroke, RecordingContext, SequenceError, SequenceMatcher,
};

/// Resolve Neovim-style key sequences against a keymap
#[derive(Parser, Debug)]
#[command(name = "chordmap", version, about = "Resolve key sequences against a keymap")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Keymap file merged over the built-in defaults
    #[arg(long, global = true, value_name = "FILE")]
    pub keymap: Option<PathBuf>,

    /// Milliseconds an ambiguous sequence waits for another key
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Platform override table to apply (mac, linux, windows)
    #[arg(long, global = true, value_name = "NAME")]
    pub platform: Option<String>,

    /// Reject duplicate sequences within one keymap layer
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Build the keymap and print every effective binding
    Check,
    /// Replay a key script (read from stdin when no file is given)
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: Option<PathBuf>,
    },
}

impl CliArgs {
    /// Layer command-line flags over file configuration
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(platform) = &self.platform {
            config.platform = Some(platform.clone());
        }
        config.strict |= self.strict;
        config
    }
}

// ============================================================================
// Replay scripts
// ============================================================================

/// One whitespace-separated token of a replay script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Keys pressed one after another at the current time
    Press(Vec<Keystroke>),
    /// Advance the virtual clock, firing a due timeout
    Advance(Duration),
    /// Drop any pending input
    Reset,
}

/// Parse a replay script
///
/// `+N` advances the clock by N milliseconds, `reset` resets the matcher, and
/// anything else is key notation. `#` starts a comment that runs to end of line.
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, SequenceError> {
    let mut steps = Vec::new();
    for line in script.lines() {
        let line = line.split_once('#').map_or(line, |(code, _)| code);
        for token in line.split_whitespace() {
            let step = if token == "reset" {
                ScriptStep::Reset
            } else if let Some(ms) = token.strip_prefix('+').and_then(|n| n.parse().ok()) {
                ScriptStep::Advance(Duration::from_millis(ms))
            } else {
                ScriptStep::Press(parse_keystrokes(token)?)
            };
            steps.push(step);
        }
    }
    Ok(steps)
}

/// A command fired during replay, with the virtual time it fired at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub at: Duration,
    pub command: Command,
}

/// Run a parsed script through `matcher`, executing fired commands on `ctx`
///
/// The clock starts at zero and only moves on `Advance`, so keys in the same
/// run of tokens arrive together. Whatever is still pending at the end stays
/// pending.
pub fn replay(
    matcher: &mut SequenceMatcher<Command>,
    steps: &[ScriptStep],
    ctx: &mut RecordingContext,
) -> Vec<Fired> {
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;
    let mut fired = Vec::new();

    for step in steps {
        match step {
            ScriptStep::Press(keystrokes) => {
                for keystroke in keystrokes {
                    let outcome = matcher.handle_keystroke(keystroke.clone(), start + elapsed);
                    for command in outcome.actions {
                        command.run(&mut *ctx);
                        fired.push(Fired { at: elapsed, command });
                    }
                }
            }
            ScriptStep::Advance(by) => {
                elapsed += *by;
                if let Some(command) = matcher.poll(start + elapsed) {
                    command.run(&mut *ctx);
                    fired.push(Fired { at: elapsed, command });
                }
            }
            ScriptStep::Reset => matcher.reset(),
        }
    }

    fired
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::keymap::{parse_keystroke, BindingTable, Call, MergePolicy};

    fn matcher() -> SequenceMatcher<Command> {
        let table = BindingTable::build(
            [
                ("<C-w>", Command::Refresh),
                ("<C-w>l", Command::Forward),
                ("<C-w>h", Command::Back),
                ("<C-c>", Command::Interrupt),
            ],
            [],
            MergePolicy::Strict,
        )
        .unwrap();
        SequenceMatcher::with_timeout(Arc::new(table), Duration::from_millis(1000))
    }

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_check_subcommand() {
        let args = args(&["chordmap", "check"]);
        assert_eq!(args.command, CliCommand::Check);
        assert!(args.keymap.is_none());
        assert!(!args.strict);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = args(&[
            "chordmap",
            "replay",
            "keys.txt",
            "--keymap",
            "my.yaml",
            "--timeout-ms",
            "250",
            "--platform",
            "mac",
            "--strict",
        ]);
        assert_eq!(
            args.command,
            CliCommand::Replay {
                script: Some(PathBuf::from("keys.txt"))
            }
        );
        assert_eq!(args.keymap, Some(PathBuf::from("my.yaml")));

        let config = args.apply(EngineConfig::default());
        assert_eq!(config.timeout_ms, 250);
        assert_eq!(config.platform.as_deref(), Some("mac"));
        assert!(config.strict);
    }

    #[test]
    fn test_flags_keep_file_values_when_absent() {
        let file = EngineConfig {
            timeout_ms: 400,
            platform: Some("linux".to_string()),
            strict: true,
        };
        let config = args(&["chordmap", "check"]).apply(file.clone());
        assert_eq!(config, file);
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(CliArgs::try_parse_from(["chordmap"]).is_err());
    }

    #[test]
    fn test_parse_script() {
        let steps = parse_script("<C-w>l +500 # comment <C-c>\nreset\n+ ").unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Press(vec![
                    parse_keystroke("<C-w>").unwrap(),
                    parse_keystroke("l").unwrap()
                ]),
                ScriptStep::Advance(Duration::from_millis(500)),
                ScriptStep::Reset,
                ScriptStep::Press(vec![parse_keystroke("+").unwrap()]),
            ]
        );
    }

    #[test]
    fn test_parse_script_rejects_bad_notation() {
        assert_eq!(
            parse_script("<C-w"),
            Err(SequenceError::Unterminated(0))
        );
    }

    #[test]
    fn test_replay_sequence_and_timeout() {
        let mut matcher = matcher();
        let mut ctx = RecordingContext::new();
        let steps = parse_script("<C-w>h <C-w> +999 +1 <C-c>").unwrap();

        let fired = replay(&mut matcher, &steps, &mut ctx);

        assert_eq!(
            fired,
            vec![
                Fired {
                    at: Duration::ZERO,
                    command: Command::Back
                },
                Fired {
                    at: Duration::from_millis(1000),
                    command: Command::Refresh
                },
                Fired {
                    at: Duration::from_millis(1000),
                    command: Command::Interrupt
                },
            ]
        );
        assert_eq!(ctx.calls, vec![Call::Back, Call::Refresh, Call::Interrupt]);
    }

    #[test]
    fn test_replay_reset_drops_pending() {
        let mut matcher = matcher();
        let mut ctx = RecordingContext::new();
        let steps = parse_script("<C-w> reset +2000 l").unwrap();

        let fired = replay(&mut matcher, &steps, &mut ctx);

        assert!(fired.is_empty());
        assert!(ctx.calls.is_empty());
    }
}
