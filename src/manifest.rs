//! `package.json` handling.
//!
//! The manifest is kept as an ordered JSON object (`serde_json` is built with
//! `preserve_order`), so keys the pipeline does not touch are written back
//! in their original order with their original values.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::ToolConfig;
use crate::error::{EletractError, Result};
use crate::provision_state::ProvisionStep;

pub const MANIFEST_FILE: &str = "package.json";

/// Script that launches Electron alone
pub const ELECTRON_SCRIPT: &str = "electron";
/// Script that launches the dev server and Electron together
pub const DEV_SCRIPT: &str = "dev";

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl ProjectManifest {
    /// Read and parse `package.json` from a project root
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)
            .map_err(|e| EletractError::manifest(&path, e.to_string()))?;
        Self::parse(path, &content)
    }

    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(fields)) => Ok(Self { path, fields }),
            Ok(_) => Err(EletractError::manifest(&path, "top-level value is not an object")),
            Err(e) => Err(EletractError::manifest(&path, e.to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.fields.get("scripts")?.get(name)?.as_str()
    }

    /// Point `main` at the Electron entry and add the launch scripts.
    ///
    /// Applying this more than once leaves the manifest unchanged.
    pub fn apply_shell_scripts(&mut self, config: &ToolConfig) {
        self.fields
            .insert("main".to_string(), Value::String(config.shell_entry_main()));

        let scripts = self
            .fields
            .entry("scripts")
            .or_insert_with(|| Value::Object(Map::new()));
        if !scripts.is_object() {
            warn!("\"scripts\" in package.json is not an object; replacing it");
            *scripts = Value::Object(Map::new());
        }

        if let Value::Object(scripts) = scripts {
            scripts.insert(
                ELECTRON_SCRIPT.to_string(),
                Value::String("electron .".to_string()),
            );
            scripts.insert(DEV_SCRIPT.to_string(), Value::String(dev_script(config)));
        }
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.fields)
            .map_err(|e| EletractError::manifest(&self.path, e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    /// Overwrite the manifest file
    pub fn save(&self) -> Result<()> {
        let json = self.to_pretty_string()?;
        fs::write(&self.path, json)
            .map_err(|e| EletractError::io(ProvisionStep::WriteManifest, &self.path, e))
    }
}

/// `concurrently` command that starts the dev server and, once its port
/// answers, Electron.
pub fn dev_script(config: &ToolConfig) -> String {
    format!(
        "concurrently \"npm start\" \"wait-on {} && npm run {}\"",
        config.dev_server_url, ELECTRON_SCRIPT
    )
}
