//! Built-in commands that keybindings can fire
//!
//! These are the action handles a keymap file can name. Each one only talks
//! to the host through [`ActionContext`].

use std::fmt;
use std::str::FromStr;

use super::context::ActionContext;

/// All commands that can be bound to keys from a keymap file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Go back in the focused view's history
    Back,
    /// Go forward in the focused view's history
    Forward,
    /// Reload the focused view
    Refresh,
    /// Select everything in the focused content
    SelectAll,
    /// Show/hide the find bar and focus it
    ToggleFind,
    /// Ask the host to interrupt itself (Ctrl+C in a terminal host)
    Interrupt,
    /// Removes a binding inherited from a lower keymap layer
    Unbound,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Back,
        Command::Forward,
        Command::Refresh,
        Command::SelectAll,
        Command::ToggleFind,
        Command::Interrupt,
        Command::Unbound,
    ];

    /// Run the command against the host
    pub fn run(self, ctx: &mut dyn ActionContext) {
        match self {
            Command::Back => ctx.focused().back(),
            Command::Forward => ctx.focused().forward(),
            Command::Refresh => ctx.focused().refresh(),
            Command::SelectAll => ctx.focused().select_all(),
            Command::ToggleFind => ctx.focused().toggle_find(),
            Command::Interrupt => ctx.interrupt(),
            Command::Unbound => {}
        }
    }

    /// Name used in keymap files
    pub fn name(self) -> &'static str {
        match self {
            Command::Back => "Back",
            Command::Forward => "Forward",
            Command::Refresh => "Refresh",
            Command::SelectAll => "SelectAll",
            Command::ToggleFind => "ToggleFind",
            Command::Interrupt => "Interrupt",
            Command::Unbound => "Unbound",
        }
    }

    /// Human-readable name for menus and listings
    pub fn display_name(self) -> &'static str {
        match self {
            Command::Back => "Go Back",
            Command::Forward => "Go Forward",
            Command::Refresh => "Reload Page",
            Command::SelectAll => "Select All",
            Command::ToggleFind => "Find in Page",
            Command::Interrupt => "Interrupt",
            Command::Unbound => "Unbound",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Implement FromStr for Command to parse from YAML
impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Back" => Ok(Command::Back),
            "Forward" => Ok(Command::Forward),
            "Refresh" | "Reload" => Ok(Command::Refresh),
            "SelectAll" => Ok(Command::SelectAll),
            "ToggleFind" | "Find" => Ok(Command::ToggleFind),
            "Interrupt" => Ok(Command::Interrupt),
            "Unbound" => Ok(Command::Unbound),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::context::{Call, RecordingContext};

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::from_str("Back"), Ok(Command::Back));
        assert_eq!(Command::from_str("Find"), Ok(Command::ToggleFind));
        assert_eq!(Command::from_str("Reload"), Ok(Command::Refresh));
        assert_eq!(Command::from_str("back"), Err(()));
    }

    #[test]
    fn test_name_round_trip() {
        for command in Command::ALL {
            assert_eq!(command.name().parse(), Ok(command));
        }
    }

    #[test]
    fn test_run_dispatches_to_context() {
        let mut ctx = RecordingContext::new();
        for command in Command::ALL {
            command.run(&mut ctx);
        }

        assert_eq!(
            ctx.calls,
            vec![
                Call::Back,
                Call::Forward,
                Call::Refresh,
                Call::SelectAll,
                Call::ToggleFind,
                Call::Interrupt,
            ]
        );
    }
}
