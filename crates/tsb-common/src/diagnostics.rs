//! Diagnostic types and message lookup for the structural passes.
//!
//! Every pass reports what it decided through a [`Diagnostic`] record rather
//! than by failing: flattening, view demotion and dropped synthetic members are
//! INFO records, input anomalies are WARNINGs, and invariant violations are
//! ERRORs that the caller uses to block downstream planning and emission.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Info = 0,
    Warning = 1,
    Error = 2,
}

/// A structured diagnostic record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: u32,
    /// Display form of the offending identity key, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    pub message_text: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        severity: DiagnosticSeverity,
        code: u32,
        identity: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            identity,
            message_text: message.into(),
        }
    }

    /// Create a diagnostic from a code in [`DIAGNOSTIC_MESSAGES`], filling the
    /// message template with `args`.
    ///
    /// Unknown codes fall back to an ERROR with the arguments joined, so a
    /// missing table entry is still visible in the output.
    #[must_use]
    pub fn from_code(code: u32, identity: impl ToString, args: &[&str]) -> Self {
        match lookup(code) {
            Some(entry) => Self {
                severity: entry.severity,
                code,
                identity: Some(identity.to_string()),
                message_text: format_message(entry.message, args),
            },
            None => Self {
                severity: DiagnosticSeverity::Error,
                code,
                identity: Some(identity.to_string()),
                message_text: args.join(" "),
            },
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Info => "info",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Error => "error",
        };
        write!(f, "{severity} TSB{}: ", self.code)?;
        if let Some(identity) = &self.identity {
            write!(f, "[{identity}] ")?;
        }
        f.write_str(&self.message_text)
    }
}

// =============================================================================
// Collector
// =============================================================================

/// Ordered sink for diagnostics.
///
/// Insertion order is preserved so that two runs over the same input report
/// the same records in the same order.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(code = diagnostic.code, "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn count(&self, severity: DiagnosticSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn with_code(&self, code: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

// =============================================================================
// Codes and messages
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub severity: DiagnosticSeverity,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    // Structural conflicts (recovered)
    pub const ANCESTOR_FLATTENED: u32 = 1001;
    pub const DIAMOND_OVERLOADS_ADDED: u32 = 1002;
    pub const FLATTEN_EXCEPTION_APPLIED: u32 = 1003;
    pub const DIAMOND_MEMBER_OMITTED: u32 = 1004;

    // Unsatisfiable conformance (recovered)
    pub const INTERFACE_DEMOTED_TO_VIEW: u32 = 2001;
    pub const COVARIANT_OVERRIDE_SUPPRESSED: u32 = 2002;
    pub const BASE_OVERLOAD_ADDED: u32 = 2003;

    // Identity violations (fatal)
    pub const DUPLICATE_IDENTITY: u32 = 3001;
    pub const DUPLICATE_OWN_SIGNATURE: u32 = 3002;

    // Naming (fatal)
    pub const NAME_SUFFIX_EXHAUSTED: u32 = 4001;
    pub const MISSING_FINAL_NAME: u32 = 4002;
    pub const DUPLICATE_FINAL_NAME: u32 = 4003;

    // Incomplete substitution (recovered)
    pub const INCOMPLETE_SUBSTITUTION: u32 = 5001;

    // Input anomalies and surface planning
    pub const UNRESOLVED_ANCESTOR: u32 = 6001;
    pub const ANCESTOR_CYCLE: u32 = 6002;
    pub const GENERIC_STATIC_MEMBER_OMITTED: u32 = 6003;
    pub const INDEXER_OVERLOADS_CONVERTED: u32 = 6004;
    pub const EXPLICIT_IMPLEMENTATION_OMITTED: u32 = 6005;
    pub const DUPLICATE_SURFACE_SIGNATURE: u32 = 6006;
    pub const PROPERTY_OVERLOAD_OMITTED: u32 = 6007;

    // Validation gate (fatal)
    pub const VIEW_MEMBER_WITHOUT_VIEW: u32 = 7001;
    pub const DUPLICATE_CLASS_SURFACE_SIGNATURE: u32 = 7002;
}

pub mod diagnostic_messages {
    pub const ANCESTOR_FLATTENED: &str =
        "Ancestor '{0}' was flattened into the type: conflicting shapes for '{1}'.";
    pub const DIAMOND_OVERLOADS_ADDED: &str =
        "Added {0} overload(s) of '{1}' to reconcile unrelated ancestors.";
    pub const FLATTEN_EXCEPTION_APPLIED: &str =
        "Ancestor '{0}' was flattened by exception table entry: {1}";
    pub const DIAMOND_MEMBER_OMITTED: &str =
        "Member '{0}' inherited from '{1}' was omitted: a retained ancestor provides a different shape.";
    pub const INTERFACE_DEMOTED_TO_VIEW: &str =
        "Interface '{0}' cannot be satisfied on the main surface ('{1}' differs) and was moved to a view.";
    pub const COVARIANT_OVERRIDE_SUPPRESSED: &str =
        "Declaration '{0}' conflicts with base shape '{1}' and was suppressed.";
    pub const BASE_OVERLOAD_ADDED: &str =
        "Base overload '{0}' was added to keep the overload set compatible with '{1}'.";
    pub const DUPLICATE_IDENTITY: &str = "Two declared members share the identity key '{0}'.";
    pub const DUPLICATE_OWN_SIGNATURE: &str =
        "Declared members '{0}' and '{1}' normalize to the same signature.";
    pub const NAME_SUFFIX_EXHAUSTED: &str =
        "No free name for '{0}' in scope {1} after {2} attempts.";
    pub const MISSING_FINAL_NAME: &str = "No final name was reserved for '{0}' in scope {1}.";
    pub const DUPLICATE_FINAL_NAME: &str = "Final name '{0}' is used more than once in scope {1}.";
    pub const INCOMPLETE_SUBSTITUTION: &str =
        "Member '{0}' from '{1}' still references out-of-scope generic parameter(s) {2} and was omitted.";
    pub const UNRESOLVED_ANCESTOR: &str =
        "Ancestor '{0}' could not be resolved and is treated as opaque.";
    pub const ANCESTOR_CYCLE: &str = "Ancestor cycle through '{0}' was cut.";
    pub const GENERIC_STATIC_MEMBER_OMITTED: &str =
        "Static member '{0}' references the declaring type's generic parameters and was omitted.";
    pub const INDEXER_OVERLOADS_CONVERTED: &str =
        "{0} indexers were replaced by accessor methods.";
    pub const EXPLICIT_IMPLEMENTATION_OMITTED: &str =
        "Explicit implementation '{0}' is not part of the main surface.";
    pub const DUPLICATE_SURFACE_SIGNATURE: &str =
        "Member '{0}' duplicates signature '{1}' already on the surface and was omitted.";
    pub const PROPERTY_OVERLOAD_OMITTED: &str =
        "Property '{0}' would overload an existing property of the same name and was omitted.";
    pub const VIEW_MEMBER_WITHOUT_VIEW: &str =
        "View member '{0}' names ancestor '{1}', which is not a view of its type.";
    pub const DUPLICATE_CLASS_SURFACE_SIGNATURE: &str =
        "Signature '{0}' reaches the class surface more than once.";
}

use diagnostic_codes as codes;
use diagnostic_messages as messages;

const fn entry(code: u32, severity: DiagnosticSeverity, message: &'static str) -> DiagnosticMessage {
    DiagnosticMessage {
        code,
        severity,
        message,
    }
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    entry(codes::ANCESTOR_FLATTENED, DiagnosticSeverity::Info, messages::ANCESTOR_FLATTENED),
    entry(codes::DIAMOND_OVERLOADS_ADDED, DiagnosticSeverity::Info, messages::DIAMOND_OVERLOADS_ADDED),
    entry(codes::FLATTEN_EXCEPTION_APPLIED, DiagnosticSeverity::Info, messages::FLATTEN_EXCEPTION_APPLIED),
    entry(codes::DIAMOND_MEMBER_OMITTED, DiagnosticSeverity::Info, messages::DIAMOND_MEMBER_OMITTED),
    entry(codes::INTERFACE_DEMOTED_TO_VIEW, DiagnosticSeverity::Info, messages::INTERFACE_DEMOTED_TO_VIEW),
    entry(codes::COVARIANT_OVERRIDE_SUPPRESSED, DiagnosticSeverity::Info, messages::COVARIANT_OVERRIDE_SUPPRESSED),
    entry(codes::BASE_OVERLOAD_ADDED, DiagnosticSeverity::Info, messages::BASE_OVERLOAD_ADDED),
    entry(codes::DUPLICATE_IDENTITY, DiagnosticSeverity::Error, messages::DUPLICATE_IDENTITY),
    entry(codes::DUPLICATE_OWN_SIGNATURE, DiagnosticSeverity::Error, messages::DUPLICATE_OWN_SIGNATURE),
    entry(codes::NAME_SUFFIX_EXHAUSTED, DiagnosticSeverity::Error, messages::NAME_SUFFIX_EXHAUSTED),
    entry(codes::MISSING_FINAL_NAME, DiagnosticSeverity::Error, messages::MISSING_FINAL_NAME),
    entry(codes::DUPLICATE_FINAL_NAME, DiagnosticSeverity::Error, messages::DUPLICATE_FINAL_NAME),
    entry(codes::INCOMPLETE_SUBSTITUTION, DiagnosticSeverity::Info, messages::INCOMPLETE_SUBSTITUTION),
    entry(codes::UNRESOLVED_ANCESTOR, DiagnosticSeverity::Warning, messages::UNRESOLVED_ANCESTOR),
    entry(codes::ANCESTOR_CYCLE, DiagnosticSeverity::Warning, messages::ANCESTOR_CYCLE),
    entry(codes::GENERIC_STATIC_MEMBER_OMITTED, DiagnosticSeverity::Info, messages::GENERIC_STATIC_MEMBER_OMITTED),
    entry(codes::INDEXER_OVERLOADS_CONVERTED, DiagnosticSeverity::Info, messages::INDEXER_OVERLOADS_CONVERTED),
    entry(codes::EXPLICIT_IMPLEMENTATION_OMITTED, DiagnosticSeverity::Info, messages::EXPLICIT_IMPLEMENTATION_OMITTED),
    entry(codes::DUPLICATE_SURFACE_SIGNATURE, DiagnosticSeverity::Info, messages::DUPLICATE_SURFACE_SIGNATURE),
    entry(codes::PROPERTY_OVERLOAD_OMITTED, DiagnosticSeverity::Info, messages::PROPERTY_OVERLOAD_OMITTED),
    entry(codes::VIEW_MEMBER_WITHOUT_VIEW, DiagnosticSeverity::Error, messages::VIEW_MEMBER_WITHOUT_VIEW),
    entry(codes::DUPLICATE_CLASS_SURFACE_SIGNATURE, DiagnosticSeverity::Error, messages::DUPLICATE_CLASS_SURFACE_SIGNATURE),
];

pub fn lookup(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    lookup(code).map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod diagnostics_tests;
