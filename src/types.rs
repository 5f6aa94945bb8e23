//! Template selection types
//!
//! The `--template` flag is parsed once into a closed `Template` enum. Every
//! later decision (web-vitals install, App placeholder, index patching)
//! dispatches on its `ScriptFlavor`, never on the raw string.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Template names that select the TypeScript flavor
const TYPESCRIPT_NAMES: &[&str] = &["typescript", "cra-template-typescript"];

/// Source language flavor of the generated React project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFlavor {
    /// Plain JavaScript (`.js`)
    Dynamic,
    /// TypeScript (`.tsx`)
    Typed,
}

impl ScriptFlavor {
    /// Relative path of the UI entry component for this flavor
    pub const fn app_entry_path(self) -> &'static str {
        match self {
            Self::Dynamic => "src/App.js",
            Self::Typed => "src/App.tsx",
        }
    }

    /// Relative path of the bootstrap file create-react-app generates
    pub const fn bootstrap_path(self) -> &'static str {
        match self {
            Self::Dynamic => "src/index.js",
            Self::Typed => "src/index.tsx",
        }
    }

    /// Whether `web-vitals` must be installed separately.
    ///
    /// The TypeScript template ships its own reporter wiring, which the
    /// bootstrap patch removes anyway.
    pub const fn needs_web_vitals(self) -> bool {
        matches!(self, Self::Dynamic)
    }

    /// Whether the bootstrap file is rewritten after scaffolding
    pub const fn patches_bootstrap(self) -> bool {
        matches!(self, Self::Typed)
    }
}

/// Project template requested on the command line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum Template {
    /// No `--template` flag: create-react-app's default JavaScript template
    #[default]
    Default,
    /// `--template typescript` or `--template cra-template-typescript`
    TypeScript,
    /// Any other template name, forwarded verbatim to create-react-app
    Custom(String),
}

impl Template {
    /// Build from the optional CLI flag value
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            None => Self::Default,
            Some(name) => {
                let Ok(template) = name.parse::<Self>();
                template
            }
        }
    }

    /// The name forwarded to `create-react-app --template`, if any
    pub fn scaffolder_name(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::TypeScript => Some("typescript"),
            Self::Custom(name) => Some(name.as_str()),
        }
    }

    pub fn flavor(&self) -> ScriptFlavor {
        match self {
            Self::TypeScript => ScriptFlavor::Typed,
            Self::Default | Self::Custom(_) => ScriptFlavor::Dynamic,
        }
    }
}

impl FromStr for Template {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Ok(Self::Default)
        } else if TYPESCRIPT_NAMES.iter().any(|n| trimmed.eq_ignore_ascii_case(n)) {
            Ok(Self::TypeScript)
        } else {
            Ok(Self::Custom(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scaffolder_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "default"),
        }
    }
}
