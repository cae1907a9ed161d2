//! TypeScript reserved words.
//!
//! A requested name that is a reserved word gets a marker appended (`_` by
//! default) before collision resolution, so `delete` becomes `delete_` and
//! still takes part in suffixing like any other name.

use tsb_model::NameScope;

/// Words that can never be used as a declaration name.
const RESERVED_WORDS: &[&str] = &[
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "new",
    "null",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    // Strict mode
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

/// Predefined type names: legal as member names, not as type names.
const PREDEFINED_TYPE_NAMES: &[&str] = &[
    "any", "bigint", "boolean", "never", "number", "object", "string", "symbol", "undefined",
    "unknown",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Whether `name` needs the reserved-word marker in `scope`.
pub fn needs_marker(name: &str, scope: &NameScope) -> bool {
    if is_reserved_word(name) {
        return true;
    }
    matches!(
        scope,
        NameScope::Namespace { .. } | NameScope::Import { .. }
    ) && PREDEFINED_TYPE_NAMES.contains(&name)
}

/// `name` with `marker` appended when it is reserved in `scope`.
pub fn sanitize(name: &str, scope: &NameScope, marker: &str) -> String {
    if needs_marker(name, scope) {
        format!("{name}{marker}")
    } else {
        name.to_string()
    }
}
