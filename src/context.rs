//! Loaded rule context.
//!
//! A [`Context`] owns one sealed oracle. It is built by exactly one of the
//! ingestion paths and is read-only afterwards, so `&Context` can be shared
//! across threads and searched concurrently without locking.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use crate::error::{HstsError, Result};
use crate::loader::{self, LoadOptions, HEADER_LEN};
use crate::normalize::{default_encoder, AsciiEncoder};
use crate::oracle::{Oracle, Table, TableDecoder};
use crate::parser;
use crate::search::search as longest_suffix;
use crate::types::{Entry, Flags, RuleCounts};

/// Longest first line inspected when detecting the input format.
const DETECT_LINE_LIMIT: u64 = 256;

/// A loaded, sealed rule set.
#[derive(Debug)]
pub struct Context {
    table: Table,
    international: bool,
    counts: RuleCounts,
}

impl Context {
    /// Load a compact table artifact with default options.
    pub fn from_binary<R: Read>(reader: R) -> Result<Self> {
        Self::from_binary_with(reader, &LoadOptions::default())
    }

    /// Load a compact table artifact.
    pub fn from_binary_with<R: Read>(reader: R, options: &LoadOptions) -> Result<Self> {
        let table = loader::load_binary(reader, options)?;
        Ok(Self::from_compact(table))
    }

    /// Load a compact table artifact decoded by a caller-supplied decoder.
    pub fn from_binary_with_decoder<R: Read>(
        reader: R,
        options: &LoadOptions,
        decoder: Box<dyn TableDecoder>,
    ) -> Result<Self> {
        let table = loader::load_binary_with_decoder(reader, options, decoder)?;
        Ok(Self::from_compact(table))
    }

    fn from_compact(table: crate::oracle::CompactTable) -> Self {
        Self {
            international: table.utf_mode(),
            table: Table::Compact(table),
            counts: RuleCounts::default(),
        }
    }

    /// Compile a PSL-style text rule stream with default options.
    pub fn from_text<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_text_with(reader, &LoadOptions::default(), default_encoder())
    }

    /// Compile a PSL-style text rule stream.
    pub fn from_text_with<R: BufRead>(
        reader: R,
        options: &LoadOptions,
        encoder: &dyn AsciiEncoder,
    ) -> Result<Self> {
        let compiled = parser::compile_rules(reader, options, encoder)?;
        Ok(Self {
            table: Table::Vector(compiled.rules),
            international: compiled.international,
            counts: compiled.counts,
        })
    }

    /// Load either format, detected from the first line.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        Self::load_with(reader, &LoadOptions::default())
    }

    /// Load either format, detected from the first line.
    ///
    /// A first line that is exactly an artifact header selects the binary
    /// path; anything else is replayed into the text compiler.
    pub fn load_with<R: BufRead>(mut reader: R, options: &LoadOptions) -> Result<Self> {
        let mut first = Vec::with_capacity(HEADER_LEN);
        reader
            .by_ref()
            .take(DETECT_LINE_LIMIT)
            .read_until(b'\n', &mut first)?;

        if loader::is_header(&first) {
            return Self::from_binary_with(Cursor::new(first).chain(reader), options);
        }
        Self::from_text_with(Cursor::new(first).chain(reader), options, default_encoder())
    }

    /// Load a file in either format.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_file_with(path, &LoadOptions::default())
    }

    /// Load a file in either format.
    pub fn load_file_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "loading rules");
        Self::load_with(BufReader::new(file), options)
    }

    /// Find the most specific rule covering `domain`.
    ///
    /// `domain` must already be normalized (lowercase, and punycode for
    /// international labels unless [`has_international_labels`] is set).
    ///
    /// [`has_international_labels`]: Context::has_international_labels
    pub fn search(&self, domain: &str) -> Option<Entry> {
        longest_suffix(&self.table, domain).map(Entry::new)
    }

    /// Exact lookup without ancestor traversal.
    pub fn lookup(&self, suffix: &str) -> Option<Flags> {
        self.table.lookup(suffix)
    }

    /// Whether the rules include international (UTF-8) labels.
    pub fn has_international_labels(&self) -> bool {
        self.international
    }

    /// Rule counters; zero for compact tables.
    pub fn counts(&self) -> RuleCounts {
        self.counts
    }

    /// Number of stored rules, when the backend can tell.
    pub fn rule_count(&self) -> Option<usize> {
        self.table.rule_count()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Release the context. Equivalent to dropping it.
    pub fn release(self) {
        tracing::debug!(rules = ?self.table.rule_count(), "releasing context");
    }
}

/// Load a compact table artifact.
pub fn load_from_binary<R: Read>(reader: R) -> Result<Context> {
    Context::from_binary(reader)
}

/// Compile a text rule stream.
pub fn load_from_text<R: BufRead>(reader: R) -> Result<Context> {
    Context::from_text(reader)
}

/// Search with nullable arguments.
///
/// A missing context or domain is `InvalidArgument`; a domain with no
/// covering rule is `Ok(None)`.
pub fn search(context: Option<&Context>, domain: Option<&str>) -> Result<Option<Entry>> {
    let context =
        context.ok_or_else(|| HstsError::InvalidArgument("context is missing".to_string()))?;
    let domain =
        domain.ok_or_else(|| HstsError::InvalidArgument("domain is missing".to_string()))?;
    Ok(context.search(domain))
}
