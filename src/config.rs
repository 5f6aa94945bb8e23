//! Tool configuration.
//!
//! Defaults reproduce the stock behavior: `npx create-react-app`, `npm`, and
//! an Electron window of 800x600 pointed at `http://localhost:3000`. A JSON
//! file passed with `--config` can override any field, and `ELETRACT_NPM` /
//! `ELETRACT_NPX` override the tool binaries.
//!
//! `dev_server_url` only changes what Electron loads and what `wait-on`
//! waits for. The React dev server still listens on port 3000 unless the
//! generated project sets `PORT`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{EletractError, Result};

/// Environment variable overriding the npm binary
pub const NPM_ENV: &str = "ELETRACT_NPM";
/// Environment variable overriding the npx binary
pub const NPX_ENV: &str = "ELETRACT_NPX";
/// Address `npm start` serves on when the project sets no `PORT`
pub const DEFAULT_DEV_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Package runner used to invoke the scaffolder
    pub npx: String,
    /// Package installer
    pub npm: String,
    /// Scaffolder package run through npx
    pub scaffolder: String,
    /// Directory (relative to the project root) holding the Electron entry
    pub shell_dir: String,
    /// File name of the Electron entry inside `shell_dir`
    pub shell_entry: String,
    /// Address of the React dev server
    pub dev_server_url: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            npx: "npx".to_string(),
            npm: "npm".to_string(),
            scaffolder: "create-react-app".to_string(),
            shell_dir: "electron".to_string(),
            shell_entry: "electron.js".to_string(),
            dev_server_url: DEFAULT_DEV_SERVER_URL.to_string(),
            window_width: 800,
            window_height: 600,
        }
    }
}

impl ToolConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EletractError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            EletractError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply `ELETRACT_NPM` / `ELETRACT_NPX` overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var(NPM_ENV).ok(), std::env::var(NPX_ENV).ok())
    }

    fn with_overrides(mut self, npm: Option<String>, npx: Option<String>) -> Self {
        if let Some(npm) = npm.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("npm overridden by {}: {}", NPM_ENV, npm);
            self.npm = npm;
        }
        if let Some(npx) = npx.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("npx overridden by {}: {}", NPX_ENV, npx);
            self.npx = npx;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("npx", &self.npx),
            ("npm", &self.npm),
            ("scaffolder", &self.scaffolder),
            ("shell_dir", &self.shell_dir),
            ("shell_entry", &self.shell_entry),
        ] {
            if value.trim().is_empty() {
                return Err(EletractError::config(format!("{} must not be empty", field)));
            }
        }

        for (field, value) in [("shell_dir", &self.shell_dir), ("shell_entry", &self.shell_entry)] {
            if value.contains("..") || Path::new(value).is_absolute() {
                return Err(EletractError::config(format!(
                    "{} must be a path inside the project: {}",
                    field, value
                )));
            }
        }

        if self.shell_entry.contains(['/', '\\']) {
            return Err(EletractError::config(format!(
                "shell_entry must be a file name inside shell_dir: {}",
                self.shell_entry
            )));
        }

        if !(self.dev_server_url.starts_with("http://") || self.dev_server_url.starts_with("https://")) {
            return Err(EletractError::config(format!(
                "dev_server_url must be an http(s) URL: {}",
                self.dev_server_url
            )));
        }

        if self.window_width == 0 || self.window_height == 0 {
            return Err(EletractError::config("window dimensions must be non-zero"));
        }

        if !self.uses_default_dev_server() {
            tracing::warn!(
                "dev_server_url {} differs from {}; `npm start` only serves there if the project sets PORT (e.g. in .env)",
                self.dev_server_url,
                DEFAULT_DEV_SERVER_URL
            );
        }

        Ok(())
    }

    /// Whether the dev server address is the one `npm start` uses out of the box
    pub fn uses_default_dev_server(&self) -> bool {
        self.dev_server_url.trim_end_matches('/') == DEFAULT_DEV_SERVER_URL
    }

    /// Project-relative path of the Electron entry, as written to `main`
    pub fn shell_entry_main(&self) -> String {
        format!("./{}/{}", self.shell_dir, self.shell_entry)
    }
}
