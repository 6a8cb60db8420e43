use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::AppConfig;

/// Languages the execution engine can run.
/// Serialized/deserialized in `lowercase` for request JSON.
/// Common aliases are accepted (e.g., "py", "js", "node").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "py", alias = "python3")]
    Python, // "python"
    #[serde(alias = "js", alias = "node")]
    JavaScript, // "javascript"
}

impl Language {
    /// Every language the engine accepts, in a stable order.
    pub const ALL: [Language; 2] = [Language::Python, Language::JavaScript];

    /// Canonical lowercase name, as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a language name is not one of [`Language::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported language: {}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" | "py" => Ok(Language::Python),
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

pub trait LanguageExt {
    /// File name the synthesized program is written to, e.g. "main.py".
    fn main_filename(&self) -> &'static str;

    /// Interpreter binary, taken from the global config so hosts can pin versions.
    fn interpreter(&self, config: &AppConfig) -> String;

    /// Arguments that make the interpreter parse `path` without executing it.
    fn syntax_check_args(&self, path: &str) -> Vec<String>;
}

impl LanguageExt for Language {
    fn main_filename(&self) -> &'static str {
        match self {
            Language::Python => "main.py",
            Language::JavaScript => "main.js",
        }
    }

    fn interpreter(&self, config: &AppConfig) -> String {
        match self {
            Language::Python => config.python_bin.clone(),
            Language::JavaScript => config.node_bin.clone(),
        }
    }

    fn syntax_check_args(&self, path: &str) -> Vec<String> {
        match self {
            Language::Python => vec![
                "-c".to_string(),
                "import sys; compile(open(sys.argv[1], encoding='utf-8').read(), 'submission.py', 'exec')"
                    .to_string(),
                path.to_string(),
            ],
            // Compiled the same way the harness runs it, so a top-level `return` is accepted.
            Language::JavaScript => vec![
                "-e".to_string(),
                "const src = require('fs').readFileSync(process.argv[1], 'utf8'); \
                 try { require('vm').compileFunction(src, ['exports', 'require', 'module', '__filename', '__dirname'], { filename: 'submission.js' }); } \
                 catch (e) { process.stderr.write(e.name + ': ' + e.message + '\\n'); process.exit(1); }"
                    .to_string(),
                path.to_string(),
            ],
        }
    }
}
