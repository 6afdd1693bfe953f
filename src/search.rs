//! Longest-suffix search.
//!
//! Walks a domain from the full name toward its top label, one oracle
//! lookup per label, and stops at the first (most specific) rule found.
//! A rule found for a strict ancestor only covers the queried domain when
//! it opted in:
//! - `INCLUDE_SUBDOMAINS` covers every descendant
//! - `WILDCARD` covers names exactly one label below the rule
//!
//! Otherwise the search reports no match. Cost is one lookup per label.

use crate::oracle::Oracle;
use crate::types::Flags;

/// Find the flags of the most specific rule covering `domain`.
///
/// A single leading dot is ignored. An empty domain never matches unless
/// an empty rule exists.
pub fn search<O: Oracle + ?Sized>(oracle: &O, domain: &str) -> Option<Flags> {
    let domain = domain.strip_prefix('.').unwrap_or(domain);

    let mut candidate = domain;
    let mut depth = 0usize;

    loop {
        if let Some(flags) = oracle.lookup(candidate) {
            let covered = depth == 0
                || flags.has_include_subdomains()
                || (depth == 1 && flags.is_wildcard());
            return covered.then_some(flags);
        }

        let dot = candidate.find('.')?;
        candidate = &candidate[dot + 1..];
        depth += 1;
    }
}
