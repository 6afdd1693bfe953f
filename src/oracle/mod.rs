pub mod dafsa;

pub use dafsa::{CompactTable, DafsaDecoder, TableDecoder};

use crate::store::SealedRules;
use crate::types::Flags;

/// Exact-match lookup over a loaded rule set
pub trait Oracle: Send + Sync {
    /// Flags stored for `key`, or `None` when `key` is not a rule.
    fn lookup(&self, key: &str) -> Option<Flags>;
}

impl Oracle for SealedRules {
    fn lookup(&self, key: &str) -> Option<Flags> {
        SealedRules::lookup(self, key)
    }
}

/// Enum wrapper for the two oracle backends
#[derive(Debug)]
pub enum Table {
    /// Precompiled compact table loaded from a binary artifact
    Compact(CompactTable),
    /// Sorted rule vector built from a text rule file
    Vector(SealedRules),
}

impl Table {
    /// Number of rules, when the backend can tell.
    pub fn rule_count(&self) -> Option<usize> {
        match self {
            Table::Compact(_) => None,
            Table::Vector(rules) => Some(rules.len()),
        }
    }
}

impl Oracle for Table {
    fn lookup(&self, key: &str) -> Option<Flags> {
        match self {
            Table::Compact(t) => t.lookup(key),
            Table::Vector(t) => t.lookup(key),
        }
    }
}
