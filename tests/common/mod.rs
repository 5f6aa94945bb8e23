//! Shared fixtures for integration tests
//!
//! `FakeRunner` stands in for npx/npm. It records every invocation and, when
//! asked to run create-react-app, lays out a minimal project the way the real
//! scaffolder does, so the rest of the pipeline has real files to work on.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::Path;

use eletract::{CommandOutcome, CommandRunner, Invocation, Provisioner, ToolConfig};

pub const CRA_PACKAGE_JSON: &str = r#"{
  "name": "my-app",
  "version": "0.1.0",
  "private": true,
  "dependencies": {
    "react": "^18.2.0",
    "react-dom": "^18.2.0",
    "react-scripts": "5.0.1"
  },
  "scripts": {
    "start": "react-scripts start",
    "build": "react-scripts build",
    "test": "react-scripts test",
    "eject": "react-scripts eject"
  },
  "eslintConfig": {
    "extends": ["react-app", "react-app/jest"]
  }
}
"#;

pub const CRA_INDEX_JS: &str = "import React from 'react';
import ReactDOM from 'react-dom/client';
import './index.css';
import App from './App';
import reportWebVitals from './reportWebVitals';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);

reportWebVitals();
";

pub const CRA_INDEX_TSX: &str = "import React from 'react';
import ReactDOM from 'react-dom/client';
import './index.css';
import App from './App';
import reportWebVitals from './reportWebVitals';

const root = ReactDOM.createRoot(
  document.getElementById('root') as HTMLElement
);
root.render(<App />);

reportWebVitals();
";

pub const SCAFFOLDED_APP: &str = "export default function App() { return null; }\n";

/// How a matching command should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Ran and exited with this code
    Exit(i32),
    /// Ran and was killed by a signal
    Signal,
    /// Could not be started
    Spawn,
}

#[derive(Debug)]
pub struct FakeRunner {
    pub calls: Vec<Invocation>,
    failures: Vec<(String, Failure)>,
    manifest: String,
    write_app_entry: bool,
    write_bootstrap: bool,
    create_project: bool,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            failures: Vec::new(),
            manifest: CRA_PACKAGE_JSON.to_string(),
            write_app_entry: true,
            write_bootstrap: true,
            create_project: true,
        }
    }

    /// Fail any command whose rendered command line contains `pattern`
    pub fn failing_on(mut self, pattern: &str, failure: Failure) -> Self {
        self.failures.push((pattern.to_string(), failure));
        self
    }

    /// Scaffold without an App component
    pub fn without_app_entry(mut self) -> Self {
        self.write_app_entry = false;
        self
    }

    /// Scaffold without `src/index.js` / `src/index.tsx`
    pub fn without_bootstrap(mut self) -> Self {
        self.write_bootstrap = false;
        self
    }

    /// Scaffold with this `package.json` content
    pub fn with_manifest(mut self, content: &str) -> Self {
        self.manifest = content.to_string();
        self
    }

    /// Report success for the scaffolder but create nothing
    pub fn without_project(mut self) -> Self {
        self.create_project = false;
        self
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls.iter().map(Invocation::command_line).collect()
    }

    fn scaffold(&self, invocation: &Invocation) -> io::Result<()> {
        let name = &invocation.args[1];
        let typed = invocation
            .args
            .windows(2)
            .any(|pair| pair[0] == "--template" && pair[1] == "typescript");

        let root = invocation.cwd.join(name);
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("package.json"), &self.manifest)?;

        let (index, index_content, app) = if typed {
            ("src/index.tsx", CRA_INDEX_TSX, "src/App.tsx")
        } else {
            ("src/index.js", CRA_INDEX_JS, "src/App.js")
        };
        if self.write_bootstrap {
            fs::write(root.join(index), index_content)?;
        }
        if self.write_app_entry {
            fs::write(root.join(app), SCAFFOLDED_APP)?;
        }
        Ok(())
    }
}

impl CommandRunner for FakeRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<CommandOutcome> {
        self.calls.push(invocation.clone());

        let line = invocation.command_line();
        if let Some((_, failure)) = self.failures.iter().find(|(p, _)| line.contains(p.as_str())) {
            return match failure {
                Failure::Exit(code) => Ok(CommandOutcome::failed(Some(*code))),
                Failure::Signal => Ok(CommandOutcome::failed(None)),
                Failure::Spawn => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "No such file or directory",
                )),
            };
        }

        let is_scaffold = invocation.args.first().map(String::as_str) == Some("create-react-app");
        if is_scaffold && self.create_project {
            self.scaffold(invocation)?;
        }
        Ok(CommandOutcome::succeeded())
    }
}

pub fn provisioner(base_dir: &Path, runner: FakeRunner) -> Provisioner<FakeRunner> {
    Provisioner::new(ToolConfig::default(), base_dir, runner)
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).expect("file should be readable")
}
