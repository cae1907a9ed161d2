//! Pre-rename identity keys.
//!
//! A [`StableId`] is derived purely from input structure, so the same input
//! graph produces the same keys on every run. It is the only key the name
//! ledger accepts and the only handle binding/metadata consumers use to map a
//! declaration-surface name back to its CLR origin.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a type: `(assembly, CLR full name)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeStableId {
    pub assembly: String,
    pub clr_full_name: String,
}

impl TypeStableId {
    pub fn new(assembly: impl Into<String>, clr_full_name: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
            clr_full_name: clr_full_name.into(),
        }
    }
}

impl fmt::Display for TypeStableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.assembly, self.clr_full_name)
    }
}

/// Signature prefix of the synthetic member identity that names a view.
pub const VIEW_SIGNATURE_PREFIX: &str = "view:";

/// Identity of a member:
/// `(assembly, declaring type, member name, canonical signature, token)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberStableId {
    pub assembly: String,
    pub declaring_type: String,
    pub member_name: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_token: Option<u32>,
}

impl MemberStableId {
    pub fn new(
        declaring: &TypeStableId,
        member_name: impl Into<String>,
        signature: impl Into<String>,
        metadata_token: Option<u32>,
    ) -> Self {
        Self {
            assembly: declaring.assembly.clone(),
            declaring_type: declaring.clr_full_name.clone(),
            member_name: member_name.into(),
            signature: signature.into(),
            metadata_token,
        }
    }

    /// Identity of the accessor through which `owner` exposes the view of
    /// `ancestor`.
    pub fn view(owner: &TypeStableId, ancestor: &TypeStableId) -> Self {
        Self {
            assembly: owner.assembly.clone(),
            declaring_type: owner.clr_full_name.clone(),
            member_name: ancestor.clr_full_name.clone(),
            signature: format!("{VIEW_SIGNATURE_PREFIX}{ancestor}"),
            metadata_token: None,
        }
    }

    pub fn is_view(&self) -> bool {
        self.signature.starts_with(VIEW_SIGNATURE_PREFIX)
    }

    pub fn declaring_type_id(&self) -> TypeStableId {
        TypeStableId::new(self.assembly.clone(), self.declaring_type.clone())
    }
}

impl fmt::Display for MemberStableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}::{}|{}",
            self.assembly, self.declaring_type, self.member_name, self.signature
        )?;
        if let Some(token) = self.metadata_token {
            write!(f, "@0x{token:08X}")?;
        }
        Ok(())
    }
}

/// Identity key of anything that receives a final name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StableId {
    Type(TypeStableId),
    Member(MemberStableId),
}

impl StableId {
    pub fn as_type(&self) -> Option<&TypeStableId> {
        match self {
            StableId::Type(id) => Some(id),
            StableId::Member(_) => None,
        }
    }

    pub fn as_member(&self) -> Option<&MemberStableId> {
        match self {
            StableId::Member(id) => Some(id),
            StableId::Type(_) => None,
        }
    }
}

impl From<TypeStableId> for StableId {
    fn from(id: TypeStableId) -> Self {
        StableId::Type(id)
    }
}

impl From<MemberStableId> for StableId {
    fn from(id: MemberStableId) -> Self {
        StableId::Member(id)
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StableId::Type(id) => id.fmt(f),
            StableId::Member(id) => id.fmt(f),
        }
    }
}
