// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::decl::ObjectDecl;

/// `from <module> import <typenames>;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub module: String,
    pub typenames: Vec<String>,
}

/// One parsed source file: its imports and its object declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub imports: Vec<ImportDecl>,
    pub objects: Vec<ObjectDecl>,
}
