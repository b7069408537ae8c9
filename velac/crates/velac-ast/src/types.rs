//! Surface type syntax.
//!
//! What the parser produces for a type annotation. Surface types are pure
//! syntax; mapping them to semantic type terms (including resolving the
//! `Int`/`Float` aliases and user enum references) is the type elaborator's
//! job in `velac-res`.

use crate::name::QName;

/// A type as written in source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceType {
    /// The unit type `()`.
    Unit,
    /// A named type: a built-in primitive or a user enum.
    Name(QName),
    /// A tuple type `(T1, T2, ...)`.
    Tuple(Vec<SurfaceType>),
    /// A function type `(T1, ..., Tn) -> R`.
    Arrow(Vec<SurfaceType>, Box<SurfaceType>),
    /// A type constructor application `T[A]`.
    Apply(Box<SurfaceType>, Box<SurfaceType>),
}

impl SurfaceType {
    /// Shorthand for a named type from a dotted string, for tests.
    pub fn name(dotted: &str) -> Self {
        SurfaceType::Name(QName::parse(dotted, velac_util::SrcLoc::UNKNOWN))
    }
}
