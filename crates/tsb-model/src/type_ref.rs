//! Type references
//!
//! A [`TypeRef`] is an immutable, structurally compared reference to a type as
//! it appears in a signature, base list or generic argument. Named and nested
//! references resolve against the graph by CLR full name; everything else is
//! a wrapper around another reference or a generic parameter.

use crate::identity::TypeStableId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CORE_ASSEMBLY: &str = "System.Private.CoreLib";

/// Which declaration introduced a generic parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenericOwner {
    Type,
    Method,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenericParamRef {
    pub name: String,
    pub position: u32,
    pub owner: GenericOwner,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamedTypeRef {
    pub assembly: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<TypeRef>,
}

/// Reference to a nested type. `full_name` uses the CLR `Outer+Inner` form and
/// `type_args` is the complete argument list, outer arguments first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NestedTypeRef {
    pub assembly: String,
    pub declaring: Box<TypeRef>,
    pub name: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<TypeRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRef {
    Named(NamedTypeRef),
    Array { element: Box<TypeRef>, rank: u32 },
    Pointer { pointee: Box<TypeRef> },
    ByRef { referent: Box<TypeRef> },
    GenericParameter(GenericParamRef),
    Nested(NestedTypeRef),
}

impl TypeRef {
    pub fn named(assembly: impl Into<String>, full_name: impl Into<String>) -> Self {
        TypeRef::Named(NamedTypeRef {
            assembly: assembly.into(),
            full_name: full_name.into(),
            type_args: Vec::new(),
        })
    }

    pub fn generic(
        assembly: impl Into<String>,
        full_name: impl Into<String>,
        type_args: Vec<TypeRef>,
    ) -> Self {
        TypeRef::Named(NamedTypeRef {
            assembly: assembly.into(),
            full_name: full_name.into(),
            type_args,
        })
    }

    /// A core-library type such as `System.String`.
    pub fn core(full_name: &str) -> Self {
        TypeRef::named(CORE_ASSEMBLY, full_name)
    }

    pub fn void() -> Self {
        TypeRef::core("System.Void")
    }

    pub fn type_param(name: impl Into<String>, position: u32) -> Self {
        TypeRef::GenericParameter(GenericParamRef {
            name: name.into(),
            position,
            owner: GenericOwner::Type,
        })
    }

    pub fn method_param(name: impl Into<String>, position: u32) -> Self {
        TypeRef::GenericParameter(GenericParamRef {
            name: name.into(),
            position,
            owner: GenericOwner::Method,
        })
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    pub fn array_of_rank(element: TypeRef, rank: u32) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank: rank.max(1),
        }
    }

    pub fn pointer(pointee: TypeRef) -> Self {
        TypeRef::Pointer {
            pointee: Box::new(pointee),
        }
    }

    pub fn by_ref(referent: TypeRef) -> Self {
        TypeRef::ByRef {
            referent: Box::new(referent),
        }
    }

    /// Reference to `name` nested in `declaring`. `None` unless the declaring
    /// reference is itself named or nested.
    pub fn nested(
        declaring: TypeRef,
        name: impl Into<String>,
        type_args: Vec<TypeRef>,
    ) -> Option<Self> {
        let name = name.into();
        let (assembly, full_name) = match &declaring {
            TypeRef::Named(named) => (named.assembly.clone(), format!("{}+{name}", named.full_name)),
            TypeRef::Nested(nested) => {
                (nested.assembly.clone(), format!("{}+{name}", nested.full_name))
            }
            _ => return None,
        };
        Some(TypeRef::Nested(NestedTypeRef {
            assembly,
            declaring: Box::new(declaring),
            name,
            full_name,
            type_args,
        }))
    }

    /// Replace the argument list of a named or nested reference.
    #[must_use]
    pub fn with_args(self, type_args: Vec<TypeRef>) -> Self {
        match self {
            TypeRef::Named(named) => TypeRef::Named(NamedTypeRef { type_args, ..named }),
            TypeRef::Nested(nested) => TypeRef::Nested(NestedTypeRef {
                type_args,
                ..nested
            }),
            other => other,
        }
    }

    /// CLR full name used to resolve this reference against the graph.
    pub fn resolution_key(&self) -> Option<&str> {
        match self {
            TypeRef::Named(named) => Some(&named.full_name),
            TypeRef::Nested(nested) => Some(&nested.full_name),
            _ => None,
        }
    }

    pub fn stable_id(&self) -> Option<TypeStableId> {
        match self {
            TypeRef::Named(named) => Some(TypeStableId::new(
                named.assembly.clone(),
                named.full_name.clone(),
            )),
            TypeRef::Nested(nested) => Some(TypeStableId::new(
                nested.assembly.clone(),
                nested.full_name.clone(),
            )),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named(named) => &named.type_args,
            TypeRef::Nested(nested) => &nested.type_args,
            _ => &[],
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Named(named) if named.full_name == "System.Void")
    }

    /// Call `f` on every generic parameter reference reachable from `self`.
    pub fn for_each_generic_param(&self, f: &mut impl FnMut(&GenericParamRef)) {
        match self {
            TypeRef::GenericParameter(param) => f(param),
            TypeRef::Named(named) => {
                for arg in &named.type_args {
                    arg.for_each_generic_param(f);
                }
            }
            TypeRef::Nested(nested) => {
                nested.declaring.for_each_generic_param(f);
                for arg in &nested.type_args {
                    arg.for_each_generic_param(f);
                }
            }
            TypeRef::Array { element, .. } => element.for_each_generic_param(f),
            TypeRef::Pointer { pointee } => pointee.for_each_generic_param(f),
            TypeRef::ByRef { referent } => referent.for_each_generic_param(f),
        }
    }

    pub fn mentions_generic_params(&self) -> bool {
        let mut found = false;
        self.for_each_generic_param(&mut |_| found = true);
        found
    }
}

/// Short, human-oriented rendering used in diagnostics and logs.
///
/// `System.Collections.Generic.List`1` with argument `System.Int32` renders as
/// `List<Int32>`. This is not the normalized signature form.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn short(full_name: &str) -> &str {
            let simple = full_name.rsplit(['.', '+']).next().unwrap_or(full_name);
            simple.split('`').next().unwrap_or(simple)
        }
        fn args(f: &mut fmt::Formatter<'_>, type_args: &[TypeRef]) -> fmt::Result {
            if type_args.is_empty() {
                return Ok(());
            }
            f.write_str("<")?;
            for (i, arg) in type_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")
        }

        match self {
            TypeRef::Named(named) => {
                f.write_str(short(&named.full_name))?;
                args(f, &named.type_args)
            }
            TypeRef::Nested(nested) => {
                write!(f, "{}.{}", nested.declaring, short(&nested.name))?;
                args(f, &nested.type_args)
            }
            TypeRef::Array { element, rank } => {
                write!(f, "{element}[")?;
                for _ in 1..*rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
            TypeRef::Pointer { pointee } => write!(f, "{pointee}*"),
            TypeRef::ByRef { referent } => write!(f, "{referent}&"),
            TypeRef::GenericParameter(param) => f.write_str(&param.name),
        }
    }
}
