//! Source scanner for the layer graph.
//!
//! ```text
//! domain  <-  port  <-  application  <-  infrastructure
//!                ^
//!             adapter
//! ```
//!
//! Each layer lives in `src/<layer>/` and may reference only the layers
//! listed in [`Layer::may_use`]. Test modules are not scanned.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Domain,
    Port,
    Adapter,
    Application,
    Infrastructure,
    Testkit,
}

impl Layer {
    pub const ALL: [Self; 6] = [
        Self::Domain,
        Self::Port,
        Self::Adapter,
        Self::Application,
        Self::Infrastructure,
        Self::Testkit,
    ];

    pub fn dir(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Port => "port",
            Self::Adapter => "adapter",
            Self::Application => "application",
            Self::Infrastructure => "infrastructure",
            Self::Testkit => "testkit",
        }
    }

    /// Top-level crate modules this layer may reference besides itself.
    pub fn may_use(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &[],
            Self::Port => &["domain", "error"],
            Self::Adapter => &["domain", "port", "error"],
            Self::Application => &["domain", "port", "error"],
            Self::Infrastructure => &["domain", "port", "adapter", "application", "error"],
            Self::Testkit => &["domain", "infrastructure"],
        }
    }

    /// External paths banned from the layer outright.
    pub fn banned_paths(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["tracing::", "std::fs", "std::env"],
            Self::Port => &["std::fs"],
            _ => &[],
        }
    }
}

/// A line that breaks the layer graph.
#[derive(Debug)]
pub struct Violation {
    pub file: String,
    pub line: usize,
    pub reference: String,
}

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut pending = vec![dir.to_path_buf()];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).expect("read source dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Non-comment lines of a file up to its test module.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let content = fs::read_to_string(path).expect("read source file");
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(idx, line)| (idx + 1, line.to_string()))
        .collect()
}

/// Top-level modules named by `crate::<module>` paths on a line.
fn crate_modules(line: &str) -> Vec<&str> {
    line.match_indices("crate::")
        .map(|(at, prefix)| {
            let rest = &line[at + prefix.len()..];
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            &rest[..end]
        })
        .filter(|module| !module.is_empty())
        .collect()
}

/// Every reference in `layer` that the graph does not allow.
pub fn layer_violations(layer: Layer) -> Vec<Violation> {
    let mut violations = Vec::new();

    for file in rust_files(&root().join("src").join(layer.dir())) {
        for (line_no, line) in production_lines(&file) {
            let outward = crate_modules(&line)
                .into_iter()
                .filter(|module| *module != layer.dir() && !layer.may_use().contains(module))
                .map(|module| format!("crate::{module}"));
            let banned = layer
                .banned_paths()
                .iter()
                .filter(|path| line.contains(**path))
                .map(|path| path.to_string());

            for reference in outward.chain(banned) {
                violations.push(Violation {
                    file: display_path(&file),
                    line: line_no,
                    reference,
                });
            }
        }
    }

    violations
}

/// `mod.rs` lines that do more than declare or re-export modules.
pub fn mod_file_logic(relative_dir: &str) -> Vec<Violation> {
    let exports = ["pub mod ", "mod ", "pub use ", "#[cfg"];

    rust_files(&root().join(relative_dir))
        .into_iter()
        .filter(|file| file.file_name().is_some_and(|name| name == "mod.rs"))
        .flat_map(|file| {
            production_lines(&file)
                .into_iter()
                .filter(|(_, line)| {
                    let line = line.trim();
                    !line.is_empty() && !exports.iter().any(|e| line.starts_with(e))
                })
                .map(move |(line, text)| Violation {
                    file: display_path(&file),
                    line,
                    reference: text,
                })
        })
        .collect()
}

pub fn path_exists(relative_path: &str) -> bool {
    root().join(relative_path).exists()
}
