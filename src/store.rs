//! Rule store.
//!
//! Rules are collected into a [`RuleStore`] while parsing and then sealed
//! into a [`SealedRules`] vector sorted by suffix. Sealing consumes the
//! builder, so a sealed store can never be mutated again.

use std::collections::HashMap;
use std::mem;

use crate::error::{HstsError, Result};
use crate::types::Flags;

/// Rule store in its building phase.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<(String, Flags)>,
    index: HashMap<String, usize>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store sized for roughly `capacity` rules.
    ///
    /// Fails with `OutOfMemory` instead of aborting when the reservation
    /// cannot be made.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut store = Self::new();
        store.reserve(capacity)?;
        Ok(store)
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        let bytes = additional.saturating_mul(mem::size_of::<(String, Flags)>());
        self.rules
            .try_reserve(additional)
            .map_err(|_| HstsError::OutOfMemory(bytes))?;
        self.index
            .try_reserve(additional)
            .map_err(|_| HstsError::OutOfMemory(bytes))
    }

    /// Insert a rule, or union its flags into an existing rule with the same
    /// suffix. Returns the flags now stored for `suffix`.
    pub fn insert(&mut self, suffix: &str, flags: Flags) -> Result<Flags> {
        if let Some(&idx) = self.index.get(suffix) {
            let stored = &mut self.rules[idx].1;
            if stored.merge(flags) {
                tracing::warn!(
                    suffix,
                    kept = ?stored.section(),
                    dropped = ?flags.section(),
                    "rule declared in both ICANN and PRIVATE sections"
                );
            }
            return Ok(*stored);
        }

        self.reserve(1)?;
        let key = try_to_owned(suffix)?;
        let value = try_to_owned(suffix)?;
        self.index.insert(key, self.rules.len());
        self.rules.push((value, flags));
        Ok(flags)
    }

    /// Stored flags for `suffix`, if present.
    pub fn exact_lookup(&self, suffix: &str) -> Option<Flags> {
        self.index.get(suffix).map(|&idx| self.rules[idx].1)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Finalize into a sorted, read-only vector.
    pub fn seal(self) -> SealedRules {
        let mut rules = self.rules;
        rules.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        rules.shrink_to_fit();
        SealedRules { rules }
    }
}

fn try_to_owned(s: &str) -> Result<String> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(s.len())
        .map_err(|_| HstsError::OutOfMemory(s.len()))?;
    owned.push_str(s);
    Ok(owned)
}

/// Sealed rule vector, sorted by suffix for binary search.
#[derive(Debug, Clone, Default)]
pub struct SealedRules {
    rules: Vec<(String, Flags)>,
}

impl SealedRules {
    /// O(log n) exact lookup.
    pub fn lookup(&self, suffix: &str) -> Option<Flags> {
        self.rules
            .binary_search_by(|(s, _)| s.as_str().cmp(suffix))
            .ok()
            .map(|idx| self.rules[idx].1)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in suffix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Flags)> {
        self.rules.iter().map(|(s, f)| (s.as_str(), *f))
    }
}
