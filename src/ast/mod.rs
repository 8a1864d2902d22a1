/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Definitions, statements and expressions as sum types
/// - types: The type algebra shared by the checker and the code generator
pub mod ast;
pub mod types;

#[cfg(test)]
mod tests;
