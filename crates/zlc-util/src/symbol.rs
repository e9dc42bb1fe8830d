//! Interned strings.
//!
//! Identifiers and string literals are interned once and passed around
//! as a copyable `Symbol` index. Interned strings live for the whole
//! process, so `Symbol::as_str` hands out `'static` references and
//! symbol comparison is an integer comparison.
//!
//! The table is lock-free (`DashMap` keyed with `ahash`), so the
//! interner stays usable from tests running in parallel.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use ahash::RandomState;
use dashmap::DashMap;

/// An interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

static TABLE: LazyLock<Interner> = LazyLock::new(Interner::new);

struct Interner {
    /// string -> index, for interning.
    names: DashMap<&'static str, u32, RandomState>,

    /// index -> string, for `as_str`.
    strings: DashMap<u32, &'static str, RandomState>,

    /// Next free index.
    next: AtomicU32,
}

impl Interner {
    fn new() -> Self {
        Self {
            names: DashMap::with_hasher(RandomState::new()),
            strings: DashMap::with_hasher(RandomState::new()),
            next: AtomicU32::new(0),
        }
    }

    fn intern(&self, string: &str) -> u32 {
        if let Some(index) = self.names.get(string) {
            return *index;
        }

        // Leak the string so it outlives the map entry. Each distinct
        // string is leaked at most once (a racing insert reuses the
        // winner's index, the loser's allocation is dropped by entry()).
        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let entry = *self.names.entry(leaked).or_insert_with(|| {
            let index = self.next.fetch_add(1, Ordering::Relaxed);
            self.strings.insert(index, leaked);
            index
        });
        entry
    }

    fn resolve(&self, index: u32) -> &'static str {
        self.strings
            .get(&index)
            .map(|entry| *entry)
            .unwrap_or("<unknown symbol>")
    }
}

impl Symbol {
    /// Interns a string, returning its symbol.
    pub fn intern(string: &str) -> Symbol {
        Symbol(TABLE.intern(string))
    }

    /// Returns the interned string.
    pub fn as_str(self) -> &'static str {
        TABLE.resolve(self.0)
    }

    /// Returns the raw interner index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
