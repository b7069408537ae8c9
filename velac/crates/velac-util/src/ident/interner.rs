//! The global identifier table.
//!
//! Two lock-free maps: a forward map from spelling to index, and a
//! reverse map from index to spelling. The forward map is keyed by the
//! spelling itself, so colliding hashes are the map's problem, not ours,
//! and the reverse map makes spelling lookup O(1). Entries are allocated
//! once and leaked; the table is alive for the whole compilation process.

use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use super::Ident;

/// Global identifier table, initialized with the well-known identifiers on
/// first use.
pub static IDENT_TABLE: LazyLock<IdentTable> = LazyLock::new(|| {
    let table = IdentTable::new();
    table.seed_known_idents();
    table
});

/// Spellings pre-interned at startup. Order must match the well-known
/// constants in `ident/mod.rs`.
const KNOWN_IDENTS: [&str; 16] = [
    "Unit", "Bool", "Char", "Int8", "Int16", "Int32", "Int64", "Int",
    "Float32", "Float64", "Float", "BigInt", "Str", "Array", "Native", "Ref",
];

/// Thread-safe identifier table.
pub struct IdentTable {
    /// spelling → index. The authority on identity.
    forward: DashMap<&'static str, u32, RandomState>,
    /// index → spelling, for `Ident::as_str`.
    reverse: DashMap<u32, &'static str, RandomState>,
    /// Next free index. Starts past the reserved range.
    next_index: AtomicU32,
}

impl IdentTable {
    fn new() -> Self {
        Self {
            forward: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            reverse: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            next_index: AtomicU32::new(super::RESERVED_IDENTS_END),
        }
    }

    fn seed_known_idents(&self) {
        for (idx, spelling) in KNOWN_IDENTS.iter().enumerate() {
            let interned: &'static str = Box::leak(spelling.to_string().into_boxed_str());
            self.forward.insert(interned, idx as u32);
            self.reverse.insert(idx as u32, interned);
        }
    }

    /// Intern a spelling, returning its identifier.
    pub fn intern(&self, string: &str) -> Ident {
        if let Some(entry) = self.forward.get(string) {
            return Ident { index: *entry };
        }

        // New spelling: allocate it once with 'static lifetime. If another
        // thread got here first, its entry wins and this allocation is a
        // small one-time leak.
        let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
        match self.forward.entry(interned) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Ident {
                index: *entry.get(),
            },
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                // Publish the reverse mapping before the forward one so any
                // identifier that can be observed can also be spelled out.
                self.reverse.insert(idx, interned);
                entry.insert(idx);
                Ident { index: idx }
            }
        }
    }

    /// Get the spelling by identifier.
    pub fn get(&self, ident: Ident) -> Option<&'static str> {
        self.reverse.get(&ident.index).map(|entry| *entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_interning_is_consistent() {
        let handles: Vec<_> = (0..16)
            .map(|i| thread::spawn(move || IDENT_TABLE.intern(&format!("worker_{i}"))))
            .collect();
        let idents: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for i in 0..idents.len() {
            for j in (i + 1)..idents.len() {
                assert_ne!(idents[i], idents[j]);
            }
        }
    }

    #[test]
    fn concurrent_same_spelling() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| IDENT_TABLE.intern("sharedSpelling")))
            .collect();
        let idents: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for id in &idents[1..] {
            assert_eq!(idents[0], *id);
        }
    }

    #[test]
    fn many_spellings_roundtrip() {
        let idents: Vec<_> = (0..500)
            .map(|i| (i, IDENT_TABLE.intern(&format!("spelling_{i}"))))
            .collect();
        for (i, id) in idents {
            assert_eq!(IDENT_TABLE.get(id), Some(format!("spelling_{i}").as_str()));
        }
    }

    #[test]
    fn empty_spelling() {
        let id = IDENT_TABLE.intern("");
        assert_eq!(IDENT_TABLE.get(id), Some(""));
    }

    #[test]
    fn unknown_index_has_no_spelling() {
        let ghost = Ident {
            index: u32::MAX - 1,
        };
        assert_eq!(IDENT_TABLE.get(ghost), None);
    }
}
