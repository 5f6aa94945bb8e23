//! Contents of the files eletract generates inside the project.

use crate::config::ToolConfig;
use crate::types::ScriptFlavor;

/// Electron main-process entry.
///
/// Opens one window at the configured size pointed at the dev server,
/// recreates it on `activate` when no window is open, and quits when the
/// last window closes except on macOS.
pub fn shell_entry(config: &ToolConfig) -> String {
    format!(
        r#"// Modules to control application life and create native browser window
const {{ app, BrowserWindow }} = require('electron');

function createWindow() {{
  // Create the browser window.
  const mainWindow = new BrowserWindow({{
    width: {width},
    height: {height}
  }});

  // and load the React app on localhost.
  mainWindow.loadURL('{url}');
}}

app.whenReady().then(() => {{
  createWindow();
  app.on('activate', () => {{
    if (BrowserWindow.getAllWindows().length === 0) createWindow();
  }});
}});

app.on('window-all-closed', () => {{
  if (process.platform !== 'darwin') app.quit();
}});
"#,
        width = config.window_width,
        height = config.window_height,
        url = config.dev_server_url,
    )
}

const APP_JS: &str = r#"import React from 'react';

function App() {
  return (
    <div className="App">
      <h1>Hello from React and Electron</h1>
    </div>
  );
}

export default App;
"#;

const APP_TSX: &str = r#"import React from 'react';

function App(): JSX.Element {
  return (
    <div className="App">
      <h1>Hello from React and Electron</h1>
    </div>
  );
}

export default App;
"#;

/// Placeholder UI entry component
pub fn app_entry(flavor: ScriptFlavor) -> &'static str {
    match flavor {
        ScriptFlavor::Dynamic => APP_JS,
        ScriptFlavor::Typed => APP_TSX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_entry_defaults() {
        let content = shell_entry(&ToolConfig::default());
        assert!(content.contains("width: 800"));
        assert!(content.contains("height: 600"));
        assert!(content.contains("mainWindow.loadURL('http://localhost:3000');"));
        assert!(content.contains("app.on('activate'"));
        assert!(content.contains("getAllWindows().length === 0"));
        assert!(content.contains("process.platform !== 'darwin'"));
    }

    #[test]
    fn test_shell_entry_follows_config() {
        let config = ToolConfig {
            window_width: 1280,
            window_height: 720,
            dev_server_url: "http://127.0.0.1:5173".into(),
            ..ToolConfig::default()
        };
        let content = shell_entry(&config);
        assert!(content.contains("width: 1280"));
        assert!(content.contains("loadURL('http://127.0.0.1:5173')"));
    }

    #[test]
    fn test_app_entry_per_flavor() {
        assert!(app_entry(ScriptFlavor::Typed).contains("JSX.Element"));
        assert!(!app_entry(ScriptFlavor::Dynamic).contains("JSX.Element"));
        for flavor in [ScriptFlavor::Dynamic, ScriptFlavor::Typed] {
            assert!(app_entry(flavor).contains("export default App;"));
        }
    }
}
