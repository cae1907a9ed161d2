//! Explicit flatten exceptions.
//!
//! A few framework types declare numeric-interface ancestors whose member
//! shapes they structurally cannot satisfy (width-incompatible operators on a
//! 16-bit or native-width value). Shape analysis would reach the same answer
//! only after emitting a pile of overloads, so these pairs are flattened up
//! front. Entries are matched by the CLR full name of the type and of the
//! ancestor's generic definition.

use serde::{Deserialize, Serialize};
use tsb_model::{TypeRef, TypeSymbol};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenException {
    pub type_name: String,
    pub ancestor: String,
    pub reason: String,
}

const BUILTIN: &[(&str, &str, &str)] = &[
    (
        "System.Char",
        "System.Numerics.IBinaryInteger`1",
        "16-bit character code cannot carry the 32-bit shift and rotate shapes",
    ),
    (
        "System.Char",
        "System.Numerics.INumberBase`1",
        "character parsing overloads conflict with numeric parsing",
    ),
    (
        "System.Half",
        "System.Numerics.IBinaryFloatingPointIeee754`1",
        "half precision lacks the full IEEE 754 member surface",
    ),
    (
        "System.IntPtr",
        "System.Numerics.IBinaryInteger`1",
        "native-width integer",
    ),
    (
        "System.UIntPtr",
        "System.Numerics.IBinaryInteger`1",
        "native-width integer",
    ),
    (
        "System.Runtime.InteropServices.NFloat",
        "System.Numerics.IBinaryFloatingPointIeee754`1",
        "native-width floating point",
    ),
];

impl FlattenException {
    pub fn new(
        type_name: impl Into<String>,
        ancestor: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            ancestor: ancestor.into(),
            reason: reason.into(),
        }
    }

    /// The built-in table.
    pub fn builtin() -> Vec<FlattenException> {
        BUILTIN
            .iter()
            .map(|(ty, ancestor, reason)| FlattenException::new(*ty, *ancestor, *reason))
            .collect()
    }

    pub fn matches(&self, ty: &TypeSymbol, ancestor: &TypeRef) -> bool {
        self.type_name == ty.full_name() && ancestor.resolution_key() == Some(self.ancestor.as_str())
    }
}

/// First entry of `table` that applies to `ancestor` of `ty`.
pub fn find_exception<'a>(
    table: &'a [FlattenException],
    ty: &TypeSymbol,
    ancestor: &TypeRef,
) -> Option<&'a FlattenException> {
    table.iter().find(|entry| entry.matches(ty, ancestor))
}
