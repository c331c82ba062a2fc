//! Reserved-word vocabulary (for codegen identifier escaping).
//!
//! Source identifiers that collide with Python keywords, with Python builtins the generated code relies on, or with
//! names the runtime library exports are suffixed with [`COLLISION_SUFFIX`] at every occurrence.

/// Default blacklist.
pub const DEFAULT_RESERVED: &[&str] = &[
    // Python keywords
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "exec", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass",
    "print", "raise", "return", "try", "while", "with", "yield", "None", "True", "False",
    // Builtins and runtime exports that source programs commonly shadow
    "Data", "Float", "Int", "Numeric", "Oxphys", "array", "close", "float", "int", "input", "open", "range", "type",
    "write", "len",
];

/// Appended to a reserved identifier.
pub const COLLISION_SUFFIX: &str = "_";

/// Check whether an identifier is in the default blacklist.
pub fn is_reserved(name: &str) -> bool {
    DEFAULT_RESERVED.contains(&name)
}
