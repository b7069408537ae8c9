//! Names and namespace paths.
//!
//! A Vela name is a dotted path of identifiers `n1.n2...nk` followed by a
//! terminal identifier. The path part is the namespace; a name with an
//! empty path is unqualified and resolves relative to the current
//! namespace.

use std::fmt;

use velac_util::{Ident, SrcLoc};

/// A namespace path. The empty path is the root namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NsPath {
    parts: Vec<Ident>,
}

impl NsPath {
    /// The root namespace.
    pub fn root() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn new(parts: Vec<Ident>) -> Self {
        Self { parts }
    }

    /// Parse a dotted path such as `"A.B"`. The empty string is the root.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self {
            parts: dotted.split('.').map(Ident::intern).collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[Ident] {
        &self.parts
    }

    /// Whether `self` is a prefix of `other`, i.e. `other` is `self` or a
    /// descendant of it. The root is a prefix of every path.
    pub fn is_prefix_of(&self, other: &NsPath) -> bool {
        other.parts.len() >= self.parts.len()
            && self.parts.iter().zip(other.parts.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for NsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<root>");
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// A possibly-qualified name occurrence in source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName {
    /// The qualifier; empty for an unqualified name.
    pub namespace: NsPath,
    /// The terminal identifier.
    pub ident: Ident,
    pub loc: SrcLoc,
}

impl QName {
    pub fn new(namespace: NsPath, ident: Ident, loc: SrcLoc) -> Self {
        Self {
            namespace,
            ident,
            loc,
        }
    }

    /// An unqualified name.
    pub fn unqualified(ident: Ident, loc: SrcLoc) -> Self {
        Self {
            namespace: NsPath::root(),
            ident,
            loc,
        }
    }

    /// Parse a dotted name such as `"A.B.f"`; the last segment is the
    /// terminal identifier.
    pub fn parse(dotted: &str, loc: SrcLoc) -> Self {
        let mut parts: Vec<Ident> = dotted.split('.').map(Ident::intern).collect();
        let ident = parts.pop().expect("name must be non-empty");
        Self {
            namespace: NsPath::new(parts),
            ident,
            loc,
        }
    }

    /// A name is qualified iff it carries a non-empty namespace path.
    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_root()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_qualified() {
            write!(f, "{}.{}", self.namespace, self.ident)
        } else {
            write!(f, "{}", self.ident)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        let ns = NsPath::parse("A.B");
        assert_eq!(ns.parts().len(), 2);
        assert_eq!(format!("{ns}"), "A.B");
    }

    #[test]
    fn root_is_prefix_of_everything() {
        let root = NsPath::root();
        assert!(root.is_prefix_of(&NsPath::parse("A")));
        assert!(root.is_prefix_of(&root));
    }

    #[test]
    fn prefix_ordering() {
        let ab = NsPath::parse("A.B");
        let abc = NsPath::parse("A.B.C");
        let a = NsPath::parse("A");
        let xy = NsPath::parse("X.Y");
        assert!(ab.is_prefix_of(&ab));
        assert!(ab.is_prefix_of(&abc));
        assert!(!ab.is_prefix_of(&a));
        assert!(!ab.is_prefix_of(&xy));
    }

    #[test]
    fn qualified_names() {
        let q = QName::parse("A.B.f", SrcLoc::UNKNOWN);
        assert!(q.is_qualified());
        assert_eq!(q.ident.as_str(), "f");
        assert_eq!(format!("{q}"), "A.B.f");

        let u = QName::parse("f", SrcLoc::UNKNOWN);
        assert!(!u.is_qualified());
        assert_eq!(format!("{u}"), "f");
    }
}
