//! Signature Normalization
//!
//! Produces the canonical string every other pass uses to decide whether two
//! members are indistinguishable on the declaration surface. The same
//! function handles all five member kinds; computing it any other way in a
//! single place would make deduplication silently diverge.
//!
//! Format:
//! - method:      `M:name`N(p1,p2)->Ret`   (`` `N`` only when N > 0)
//! - property:    `P:name[i1,i2]:Type|get-set`
//! - field:       `F:name:Type` (`|readonly` when read-only)
//! - event:       `E:name:Type`
//! - constructor: `C:.ctor(p1,p2)`
//!
//! Static members get a trailing `|static`. Parameters render as
//! `mode:Type` (`in`, `out`, `ref`, `params`; value parameters unprefixed)
//! with a trailing `?` when optional. Parameter names never participate and
//! method-level generic parameters are erased to their position (`!!0`).

use std::fmt::Write;
use tsb_model::{
    Accessors, GenericOwner, MemberKind, MemberStableId, MemberSymbol, Parameter, ParameterMode,
    TypeRef, TypeStableId,
};

/// Canonical signature of a member.
pub fn normalize(member: &MemberSymbol) -> String {
    let mut out = String::with_capacity(48);
    match &member.kind {
        MemberKind::Method(shape) => {
            out.push_str("M:");
            out.push_str(&member.name);
            if !shape.generic_parameters.is_empty() {
                let _ = write!(out, "`{}", shape.generic_parameters.len());
            }
            write_parameters(&mut out, '(', &shape.parameters, ')');
            out.push_str("->");
            write_type(&mut out, &shape.return_type);
        }
        MemberKind::Property(shape) => {
            out.push_str("P:");
            out.push_str(&member.name);
            if !shape.index_parameters.is_empty() {
                write_parameters(&mut out, '[', &shape.index_parameters, ']');
            }
            out.push(':');
            write_type(&mut out, &shape.property_type);
            out.push('|');
            out.push_str(accessor_shape(shape.accessors));
        }
        MemberKind::Field(shape) => {
            out.push_str("F:");
            out.push_str(&member.name);
            out.push(':');
            write_type(&mut out, &shape.field_type);
            if shape.is_readonly {
                out.push_str("|readonly");
            }
        }
        MemberKind::Event(shape) => {
            out.push_str("E:");
            out.push_str(&member.name);
            out.push(':');
            write_type(&mut out, &shape.handler_type);
        }
        MemberKind::Constructor(shape) => {
            out.push_str("C:.ctor");
            write_parameters(&mut out, '(', &shape.parameters, ')');
        }
    }
    if member.is_static {
        out.push_str("|static");
    }
    out
}

/// Canonical form of the parameter list alone (method parameters, indexer
/// parameters, constructor parameters; empty for fields and events).
///
/// Two methods with equal parameter keys differ at most in their return
/// type, which is what the covariance partitioner needs to tell an override
/// with a narrowed return apart from a new overload.
pub fn normalize_parameters(member: &MemberSymbol) -> String {
    let mut out = String::new();
    match &member.kind {
        MemberKind::Method(shape) => {
            if !shape.generic_parameters.is_empty() {
                let _ = write!(out, "`{}", shape.generic_parameters.len());
            }
            write_parameters(&mut out, '(', &shape.parameters, ')');
        }
        MemberKind::Property(shape) => {
            write_parameters(&mut out, '[', &shape.index_parameters, ']');
        }
        MemberKind::Constructor(shape) => {
            write_parameters(&mut out, '(', &shape.parameters, ')');
        }
        MemberKind::Field(_) | MemberKind::Event(_) => {}
    }
    out
}

/// Canonical rendering of a type reference.
pub fn normalize_type(ty: &TypeRef) -> String {
    let mut out = String::new();
    write_type(&mut out, ty);
    out
}

/// Identity key of a member declared (or synthesized) on `owner`.
pub fn member_stable_id(owner: &TypeStableId, member: &MemberSymbol) -> MemberStableId {
    MemberStableId::new(owner, member.name.clone(), normalize(member), member.metadata_token)
}

const fn accessor_shape(accessors: Accessors) -> &'static str {
    match accessors {
        Accessors::Get => "get",
        Accessors::Set => "set",
        Accessors::GetSet => "get-set",
    }
}

fn write_parameters(out: &mut String, open: char, params: &[Parameter], close: char) {
    out.push(open);
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match param.mode {
            ParameterMode::Value => {}
            ParameterMode::In => out.push_str("in:"),
            ParameterMode::Out => out.push_str("out:"),
            ParameterMode::Ref => out.push_str("ref:"),
            ParameterMode::Params => out.push_str("params:"),
        }
        write_type(out, &param.ty);
        if param.is_optional {
            out.push('?');
        }
    }
    out.push(close);
}

fn write_type(out: &mut String, ty: &TypeRef) {
    match ty {
        TypeRef::Named(named) => {
            out.push_str(&named.full_name);
            write_type_args(out, &named.type_args);
        }
        TypeRef::Nested(nested) => {
            out.push_str(&nested.full_name);
            write_type_args(out, &nested.type_args);
        }
        TypeRef::Array { element, rank } => {
            write_type(out, element);
            out.push('[');
            for _ in 1..*rank {
                out.push(',');
            }
            out.push(']');
        }
        TypeRef::Pointer { pointee } => {
            write_type(out, pointee);
            out.push('*');
        }
        TypeRef::ByRef { referent } => {
            write_type(out, referent);
            out.push('&');
        }
        TypeRef::GenericParameter(param) => match param.owner {
            GenericOwner::Type => out.push_str(&param.name),
            GenericOwner::Method => {
                let _ = write!(out, "!!{}", param.position);
            }
        },
    }
}

fn write_type_args(out: &mut String, args: &[TypeRef]) {
    if args.is_empty() {
        return;
    }
    out.push('[');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_type(out, arg);
    }
    out.push(']');
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod normalize_tests;
