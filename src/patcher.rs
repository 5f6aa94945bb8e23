//! Bootstrap file rewriting for the TypeScript template.
//!
//! create-react-app's `src/index.tsx` imports and calls `reportWebVitals`
//! and imports `./App` without an extension. The pipeline removes the
//! former and makes the latter explicit. Matching is exact per line: a file
//! that was edited by hand is left as it is.

/// Rewrites a bootstrap source file.
pub trait BootstrapPatcher {
    fn patch(&self, source: &str) -> PatchOutcome;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub content: String,
    pub removed_lines: usize,
    pub rewritten_lines: usize,
}

impl PatchOutcome {
    pub fn changed(&self) -> bool {
        self.removed_lines > 0 || self.rewritten_lines > 0
    }
}

const REMOVED_LINES: &[&str] = &[
    "import reportWebVitals from './reportWebVitals';",
    "import reportWebVitals from \"./reportWebVitals\";",
    "reportWebVitals();",
];

const REWRITTEN_LINES: &[(&str, &str)] = &[
    ("import App from './App';", "import App from './App.tsx';"),
    ("import App from \"./App\";", "import App from \"./App.tsx\";"),
];

/// Exact line matching patcher used for the TypeScript template.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPatternPatcher;

impl BootstrapPatcher for TextPatternPatcher {
    fn patch(&self, source: &str) -> PatchOutcome {
        let mut content = String::with_capacity(source.len());
        let mut removed_lines = 0;
        let mut rewritten_lines = 0;

        for line in source.split_inclusive('\n') {
            let trimmed = line.trim();

            if REMOVED_LINES.contains(&trimmed) {
                removed_lines += 1;
                continue;
            }

            match REWRITTEN_LINES.iter().find(|(from, _)| *from == trimmed) {
                Some((from, to)) => {
                    content.push_str(&line.replacen(from, to, 1));
                    rewritten_lines += 1;
                }
                None => content.push_str(line),
            }
        }

        PatchOutcome {
            content,
            removed_lines,
            rewritten_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRA_INDEX_TSX: &str = "import React from 'react';
import ReactDOM from 'react-dom/client';
import './index.css';
import App from './App';
import reportWebVitals from './reportWebVitals';

const root = ReactDOM.createRoot(
  document.getElementById('root') as HTMLElement
);
root.render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);

// If you want to start measuring performance in your app, pass a function
// to log results (for example: reportWebVitals(console.log))
// or send to an analytics endpoint. Learn more: https://bit.ly/CRA-vitals
reportWebVitals();
";

    #[test]
    fn test_patch_removes_reporter_and_types_app_import() {
        let outcome = TextPatternPatcher.patch(CRA_INDEX_TSX);
        assert!(outcome.changed());
        assert_eq!(outcome.removed_lines, 2);
        assert_eq!(outcome.rewritten_lines, 1);

        assert!(!outcome.content.contains("import reportWebVitals"));
        assert!(!outcome.content.contains("reportWebVitals();"));
        assert!(outcome.content.contains("import App from './App.tsx';"));
        assert!(outcome.content.contains("root.render("));
    }

    #[test]
    fn test_patch_is_idempotent() {
        let first = TextPatternPatcher.patch(CRA_INDEX_TSX);
        let second = TextPatternPatcher.patch(&first.content);
        assert!(!second.changed());
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn test_patch_keeps_crlf_and_double_quotes() {
        let source = "import App from \"./App\";\r\nreportWebVitals();\r\nrender();\r\n";
        let outcome = TextPatternPatcher.patch(source);
        assert_eq!(outcome.content, "import App from \"./App.tsx\";\r\nrender();\r\n");
    }

    #[test]
    fn test_patch_leaves_unrelated_source_alone() {
        let source = "import App from './components/App';\nreportWebVitals(console.log);\n";
        let outcome = TextPatternPatcher.patch(source);
        assert!(!outcome.changed());
        assert_eq!(outcome.content, source);
    }
}
