//! Host platforms that can carry their own override bindings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A host OS with its own keymap override table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "macos", alias = "darwin")]
    Mac,
    Linux,
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Mac, Platform::Linux, Platform::Windows];

    /// The platform this binary was compiled for
    ///
    /// Hosts may pass any platform to the table builder; this is only the
    /// default when nothing else is configured.
    pub fn current() -> Platform {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Name used for the platform's sub-map in keymap files
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Mac => "mac",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mac" | "macos" | "darwin" => Ok(Platform::Mac),
            "linux" => Ok(Platform::Linux),
            "windows" | "win" => Ok(Platform::Windows),
            _ => Err(format!("unknown platform: {}", s)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
