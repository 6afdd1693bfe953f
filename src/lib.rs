//! HSTS Engine - public suffix and HSTS preload list matching for Rust
//!
//! This library answers one question: which registered suffix covers a
//! domain, and what policy bits does it carry. It supports:
//! - Compact precompiled tables (`.DAFSA@HSTS_` artifacts)
//! - PSL-style text rule files with ICANN/PRIVATE sections
//! - Exception (`!`) and wildcard (`*.`) rules
//! - Include-subdomains enforcement for HSTS entries
//! - Punycode registration of international rules (`idna` feature)
//!
//! # Example
//!
//! ```rust
//! use hsts_engine_r::{Context, Section};
//!
//! let rules = "
//! // ===BEGIN ICANN DOMAINS===
//! com
//! *.ck
//! !www.ck
//! // ===END ICANN DOMAINS===
//! ";
//!
//! let ctx = Context::from_text(rules.as_bytes()).unwrap();
//!
//! let entry = ctx.search("www.ck").unwrap();
//! assert!(entry.is_exception());
//! assert_eq!(entry.section(), Some(Section::Icann));
//!
//! // Wildcards cover exactly one label below the rule
//! assert!(ctx.search("foo.ck").unwrap().is_wildcard());
//! assert!(ctx.search("example.org").is_none());
//! ```
//!
//! # Matching
//!
//! A search walks from the full domain toward its top label and stops at
//! the first rule found. That rule covers the domain when:
//!
//! | Rule position | Covered when |
//! |---------------|--------------|
//! | Same as domain | always |
//! | Any ancestor | rule has `INCLUDE_SUBDOMAINS` |
//! | Parent | rule has `WILDCARD` |
//!
//! Otherwise the result is "not found". Callers normalize domains first
//! (see [`to_lookup_form`]).

#[cfg(feature = "async")]
pub mod async_load;
pub mod context;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod oracle;
pub mod parser;
pub mod search;
pub mod store;
pub mod types;
pub mod version;

#[cfg(feature = "async")]
pub use async_load::load_file_with_timeout;
pub use context::{load_from_binary, load_from_text, search, Context};
pub use error::{HstsError, HstsErrorKind, Result};
pub use loader::LoadOptions;
#[cfg(feature = "idna")]
pub use normalize::IdnaEncoder;
pub use normalize::{default_encoder, to_lookup_form, AsciiEncoder, NoopEncoder};
pub use oracle::{CompactTable, DafsaDecoder, Oracle, Table, TableDecoder};
pub use types::{Entry, Flags, RuleCounts, Section};
pub use version::{
    check_version_number, dist_filename, get_version, version_number, VERSION_MAJOR,
    VERSION_MINOR, VERSION_PATCH,
};
