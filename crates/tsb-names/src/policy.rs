//! Requested-name policy: what a type or member asks the ledger for.
//!
//! The ledger only resolves collisions; deriving the requested name from the
//! CLR name happens here.

use serde::{Deserialize, Serialize};
use tsb_model::{TypeRef, TypeSymbol, split_full_name};

/// Transform applied to requested member names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberNaming {
    /// Keep the CLR name.
    #[default]
    None,
    CamelCase,
}

impl MemberNaming {
    pub fn apply(self, name: &str) -> String {
        match self {
            MemberNaming::None => name.to_string(),
            MemberNaming::CamelCase => camel_case(name),
        }
    }
}

/// Lowercase the leading capital run, keeping the capital that starts the
/// next word: `ToString` → `toString`, `IOStream` → `ioStream`, `URL` → `url`.
pub fn camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let upper_run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lower_count = match upper_run {
        0 => return name.to_string(),
        n if n == chars.len() => n,
        1 => 1,
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            if i < lower_count {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![*c]
            }
        })
        .collect()
}

/// Identifier form of a CLR simple name: arity ticks and nesting separators
/// become `_` (`List`1` → `List_1`, `Outer+Inner` → `Outer_Inner`).
pub fn identifier_from_clr(simple_name: &str) -> String {
    simple_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Requested name of a type.
pub fn type_name(ty: &TypeSymbol) -> String {
    identifier_from_clr(&ty.name)
}

/// Requested name of the type a reference points at, if it names one.
pub fn referenced_type_name(reference: &TypeRef) -> Option<String> {
    let key = reference.resolution_key()?;
    let (_, simple) = split_full_name(key);
    Some(identifier_from_clr(simple))
}

/// Accessor through which a type exposes the view of `ancestor`.
pub fn view_accessor_name(prefix: &str, ancestor: &TypeRef) -> Option<String> {
    referenced_type_name(ancestor).map(|name| format!("{prefix}{name}"))
}

#[cfg(test)]
#[path = "tests/policy_tests.rs"]
mod policy_tests;
