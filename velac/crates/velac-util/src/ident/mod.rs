//! Identifier interning.
//!
//! An [`Ident`] is a compact (4-byte) handle to a string stored in a global
//! table. Interning gives the compiler O(1) identifier comparison and a
//! single allocation per distinct spelling, which matters because the same
//! names appear thousands of times across a program.
//!
//! # Thread safety
//!
//! The table is lock-free (`DashMap`), so identifiers can be interned from
//! any thread. Interned strings are leaked to obtain `'static` lifetime;
//! the table lives for the whole process and entries are never removed.
//!
//! # Well-known identifiers
//!
//! The spellings of Vela's built-in types are interned at startup into a
//! reserved index range, so the type elaborator can compare against them
//! without hashing.

mod interner;

pub use interner::IDENT_TABLE;

/// An interned identifier.
///
/// Compared by table index; two `Ident`s are equal iff their spellings are.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ident {
    pub(crate) index: u32,
}

/// Indices below this bound are the well-known identifiers interned at
/// table initialization.
const RESERVED_IDENTS_END: u32 = 32;

/// Well-known identifier for the `Unit` type name.
pub const TY_UNIT: Ident = Ident { index: 0 };
/// Well-known identifier for the `Bool` type name.
pub const TY_BOOL: Ident = Ident { index: 1 };
/// Well-known identifier for the `Char` type name.
pub const TY_CHAR: Ident = Ident { index: 2 };
/// Well-known identifier for the `Int8` type name.
pub const TY_INT8: Ident = Ident { index: 3 };
/// Well-known identifier for the `Int16` type name.
pub const TY_INT16: Ident = Ident { index: 4 };
/// Well-known identifier for the `Int32` type name.
pub const TY_INT32: Ident = Ident { index: 5 };
/// Well-known identifier for the `Int64` type name.
pub const TY_INT64: Ident = Ident { index: 6 };
/// Well-known identifier for the `Int` alias.
pub const TY_INT: Ident = Ident { index: 7 };
/// Well-known identifier for the `Float32` type name.
pub const TY_FLOAT32: Ident = Ident { index: 8 };
/// Well-known identifier for the `Float64` type name.
pub const TY_FLOAT64: Ident = Ident { index: 9 };
/// Well-known identifier for the `Float` alias.
pub const TY_FLOAT: Ident = Ident { index: 10 };
/// Well-known identifier for the `BigInt` type name.
pub const TY_BIGINT: Ident = Ident { index: 11 };
/// Well-known identifier for the `Str` type name.
pub const TY_STR: Ident = Ident { index: 12 };
/// Well-known identifier for the `Array` type constructor.
pub const TY_ARRAY: Ident = Ident { index: 13 };
/// Well-known identifier for the `Native` type name.
pub const TY_NATIVE: Ident = Ident { index: 14 };
/// Well-known identifier for the `Ref` type constructor.
pub const TY_REF: Ident = Ident { index: 15 };

impl Ident {
    /// Intern a spelling, returning its identifier.
    ///
    /// Same spelling always yields the same `Ident`.
    #[inline]
    pub fn intern(string: &str) -> Self {
        IDENT_TABLE.intern(string)
    }

    /// The spelling of this identifier.
    ///
    /// O(1) through the reverse table; still prefer `Ident` comparison
    /// over spelling comparison.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        IDENT_TABLE.get(*self).unwrap_or("")
    }

    /// Whether this is one of the well-known identifiers interned at
    /// startup (built-in type names).
    #[inline]
    pub fn is_known(&self) -> bool {
        self.index < RESERVED_IDENTS_END
    }

    /// The raw table index, for debugging.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Debug for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ident({})", self.as_str())
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static_assertions::assert_impl_all!(Ident: Send, Sync);
