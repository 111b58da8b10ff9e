//! Module graph loading and linking.
//!
//! The loader walks imports recursively, decoding every module through the
//! configured [`ProgramParser`], accumulating declarations in a
//! [`TypeTable`], and tagging each constructor with its declaring module
//! (see [`rewrite`]). Builtin module names never touch the disk; they are
//! satisfied from the compiled-in table. A module that appears a second
//! time on the import path - a cycle - is treated as already loaded.

mod parser;
mod rewrite;
mod table;

pub use parser::{ProgramParser, StaticParser, ToolParser};
pub use table::{Declaration, TypeTable};

// Layer 1: Standard library imports
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tracing::debug;

// Layer 3: Internal module imports
use crate::builtins;
use crate::error::LoadError;

/// File extension of frisbee sources.
pub const SOURCE_EXTENSION: &str = "frisbee";

/// Loads a module graph rooted at one entry module.
#[derive(Debug)]
pub struct Loader<P> {
    parser: P,
    root: PathBuf,
}

impl<P: ProgramParser> Loader<P> {
    /// `root` is the directory imported modules are resolved against.
    pub fn new(parser: P, root: impl Into<PathBuf>) -> Self {
        Self {
            parser,
            root: root.into(),
        }
    }

    /// Load `entry` and everything it transitively imports.
    pub fn load(&self, entry: &str) -> Result<TypeTable, LoadError> {
        let mut table = TypeTable::new();
        let mut visited = HashSet::new();
        self.load_module(entry, &mut table, &mut visited)?;
        Ok(table)
    }

    fn load_module(
        &self,
        module: &str,
        table: &mut TypeTable,
        visited: &mut HashSet<String>,
    ) -> Result<(), LoadError> {
        // Second appearance on the import path: already loaded (or mid-load
        // in a cycle); never re-parse.
        if !visited.insert(module.to_string()) {
            debug!(module, "skipping module seen before");
            return Ok(());
        }

        let path = self.source_path(module);
        let program = self.parser.parse(module, &path)?;
        debug!(module, objects = program.objects.len(), "module parsed");

        // Imported names first; local declarations shadow them below.
        let mut scope: HashMap<String, String> = HashMap::new();
        for import in &program.imports {
            if let Some(typenames) = builtins::builtin_module(&import.module) {
                if !table.contains_module(&import.module) {
                    for typename in typenames {
                        table.insert(
                            &import.module,
                            Declaration::Builtin {
                                module: import.module.clone(),
                                typename: (*typename).to_string(),
                            },
                        )?;
                    }
                }
            } else {
                self.load_module(&import.module, table, visited)?;
            }
            for typename in &import.typenames {
                scope.insert(typename.clone(), import.module.clone());
            }
        }
        for object in &program.objects {
            scope.insert(object.name.clone(), module.to_string());
        }

        for mut object in program.objects {
            object.module = Some(module.to_string());
            rewrite::resolve_constructors(&mut object, &scope, module)?;
            table.insert(module, Declaration::Object(Arc::new(object)))?;
        }
        Ok(())
    }

    fn source_path(&self, module: &str) -> PathBuf {
        self.root.join(format!("{module}.{SOURCE_EXTENSION}"))
    }
}
