//! Naming scopes.
//!
//! Final names are unique within one scope and independent across scopes, so
//! the same requested name may legally appear in two different scopes.

use crate::identity::TypeStableId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "camelCase")]
pub enum NameScope {
    /// Type names declared in one namespace.
    Namespace { namespace: String },
    /// Type names visible together in one consumer's import set.
    Import { consumer: String },
    /// Instance members of a type (and its view accessors).
    TypeInstance { owner: TypeStableId },
    /// Static members of a type.
    TypeStatic { owner: TypeStableId },
    /// Members re-emitted on the companion view of `ancestor`.
    View {
        owner: TypeStableId,
        ancestor: TypeStableId,
        is_static: bool,
    },
}

impl NameScope {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        NameScope::Namespace {
            namespace: namespace.into(),
        }
    }

    pub fn import(consumer: impl Into<String>) -> Self {
        NameScope::Import {
            consumer: consumer.into(),
        }
    }

    pub fn instance(owner: &TypeStableId) -> Self {
        NameScope::TypeInstance {
            owner: owner.clone(),
        }
    }

    pub fn static_of(owner: &TypeStableId) -> Self {
        NameScope::TypeStatic {
            owner: owner.clone(),
        }
    }

    pub fn view(owner: &TypeStableId, ancestor: &TypeStableId, is_static: bool) -> Self {
        NameScope::View {
            owner: owner.clone(),
            ancestor: ancestor.clone(),
            is_static,
        }
    }

    /// Scope a name actually lives in once static-ness is taken into account.
    ///
    /// A static request against an instance scope lands in the type's static
    /// scope; view scopes carry their own flag, which `is_static` overrides.
    #[must_use]
    pub fn effective(&self, is_static: bool) -> NameScope {
        match self {
            NameScope::TypeInstance { owner } if is_static => NameScope::static_of(owner),
            NameScope::TypeStatic { owner } if !is_static => NameScope::instance(owner),
            NameScope::View {
                owner, ancestor, ..
            } => NameScope::view(owner, ancestor, is_static),
            other => other.clone(),
        }
    }

    pub fn owner(&self) -> Option<&TypeStableId> {
        match self {
            NameScope::TypeInstance { owner }
            | NameScope::TypeStatic { owner }
            | NameScope::View { owner, .. } => Some(owner),
            NameScope::Namespace { .. } | NameScope::Import { .. } => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            NameScope::TypeStatic { .. } => true,
            NameScope::View { is_static, .. } => *is_static,
            NameScope::Namespace { .. }
            | NameScope::Import { .. }
            | NameScope::TypeInstance { .. } => false,
        }
    }
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameScope::Namespace { namespace } => write!(f, "ns({namespace})"),
            NameScope::Import { consumer } => write!(f, "import({consumer})"),
            NameScope::TypeInstance { owner } => write!(f, "instance({owner})"),
            NameScope::TypeStatic { owner } => write!(f, "static({owner})"),
            NameScope::View {
                owner,
                ancestor,
                is_static,
            } => {
                let side = if *is_static { "static" } else { "instance" };
                write!(f, "view({owner} as {ancestor}, {side})")
            }
        }
    }
}
