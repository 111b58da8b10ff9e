//! The parser seam.
//!
//! Source text is turned into an AST by an external front-end tool that
//! prints an s-expression rendering on stdout. The loader only depends on
//! the [`ProgramParser`] trait, so tests (and embedders) can feed
//! s-expression text directly without shelling out.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// Layer 2: Third-party crate imports
use tracing::debug;

// Layer 3: Internal module imports
use crate::ast::{decode_program, Program};
use crate::error::LoadError;
use crate::sexpr;

/// Produces the parsed [`Program`] for one module.
pub trait ProgramParser {
    /// Parse `module`, whose source the loader expects at `path`.
    ///
    /// Returns [`LoadError::ModuleNotFound`] when the module has no source,
    /// [`LoadError::Parse`] when the front-end rejects it.
    fn parse(&self, module: &str, path: &Path) -> Result<Program, LoadError>;
}

/// Shells out to the front-end parser binary, feeding it the source file on
/// stdin and decoding the s-expression it prints.
#[derive(Debug, Clone)]
pub struct ToolParser {
    tool: PathBuf,
}

impl ToolParser {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }
}

impl ProgramParser for ToolParser {
    fn parse(&self, module: &str, path: &Path) -> Result<Program, LoadError> {
        let source = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::ModuleNotFound {
                    module: module.to_string(),
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        debug!(module, tool = %self.tool.display(), "parsing module");

        let file = path.display().to_string();
        let parse_failure = |reason: String| LoadError::Parse {
            file: file.clone(),
            reason,
        };

        let mut child = Command::new(&self.tool)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| parse_failure(format!("cannot run parser tool: {e}")))?;

        if let Some(stdin) = child.stdin.take() {
            let mut stdin = stdin;
            stdin
                .write_all(&source)
                .map_err(|e| parse_failure(format!("cannot feed parser tool: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| parse_failure(format!("parser tool failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(parse_failure(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let tree = sexpr::parse(&text).map_err(|e| parse_failure(e.to_string()))?;
        decode_program(&tree).map_err(|source| LoadError::Decode { file, source })
    }
}

/// In-memory module set keyed by module name; each entry is s-expression
/// text in the front-end's output format.
#[derive(Debug, Clone, Default)]
pub struct StaticParser {
    sources: HashMap<String, String>,
}

impl StaticParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one module's s-expression text.
    pub fn with_module(mut self, module: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(module.into(), text.into());
        self
    }
}

impl ProgramParser for StaticParser {
    fn parse(&self, module: &str, path: &Path) -> Result<Program, LoadError> {
        let text = self
            .sources
            .get(module)
            .ok_or_else(|| LoadError::ModuleNotFound {
                module: module.to_string(),
                path: path.to_path_buf(),
            })?;
        let tree = sexpr::parse(text).map_err(|e| LoadError::Parse {
            file: module.to_string(),
            reason: e.to_string(),
        })?;
        decode_program(&tree).map_err(|source| LoadError::Decode {
            file: module.to_string(),
            source,
        })
    }
}
