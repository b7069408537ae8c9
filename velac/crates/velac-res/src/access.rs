//! The accessibility oracle.
//!
//! A declaration in namespace `N` is visible from namespace `M` iff it is
//! public, or `M` is `N` itself or a descendant of `N`. Non-public members
//! are therefore visible exactly down their own subtree.

use velac_ast::{DefDecl, EnumDecl, NsPath};

/// Whether a declaration marked `public` (or not) in `declared_in` can be
/// referenced from `from`.
pub fn is_accessible(declared_in: &NsPath, public: bool, from: &NsPath) -> bool {
    public || declared_in.is_prefix_of(from)
}

pub fn is_def_accessible(decl: &DefDecl, declared_in: &NsPath, from: &NsPath) -> bool {
    is_accessible(declared_in, decl.public, from)
}

pub fn is_enum_accessible(decl: &EnumDecl, declared_in: &NsPath, from: &NsPath) -> bool {
    is_accessible(declared_in, decl.public, from)
}
