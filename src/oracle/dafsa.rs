//! Compact table oracle.
//!
//! The artifact payload is a DAFSA (deterministic acyclic finite state
//! automaton) in the Chromium "fixed set" layout, produced offline. The
//! graph is a sequence of nodes:
//!
//! ```text
//! node        := offsets | chars end_char offsets | chars return_value
//! chars       := byte < 0x80 ...
//! end_char    := char | 0x80
//! return_value:= 0x80 | value (value < 0x20)
//! offsets     := 1, 2 or 3 byte relative offsets; 0x80 marks the last one
//! ```
//!
//! Lookup cost is proportional to the key length, not to the number of
//! encoded suffixes. Reads are bounds-checked: a truncated or corrupt graph
//! makes a lookup report "absent" instead of reading out of range.

use std::fmt;

use crate::types::Flags;

/// Decoding capability for a compact table buffer.
pub trait TableDecoder: Send + Sync {
    /// Returns the small value stored for `key`, or `None` if absent.
    fn lookup(&self, graph: &[u8], key: &[u8]) -> Option<u8>;

    /// Whether the buffer was built from UTF-8 (international) rules.
    fn utf_mode(&self, graph: &[u8]) -> bool {
        let _ = graph;
        false
    }
}

/// Chromium-compatible DAFSA decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DafsaDecoder;

impl DafsaDecoder {
    /// Read the next offset at `pos` and add it to `offset`.
    ///
    /// `pos` becomes `None` after the last offset of a list.
    fn next_offset(graph: &[u8], pos: &mut Option<usize>, offset: &mut usize) -> bool {
        let Some(p) = *pos else {
            return false;
        };
        let Some(&b0) = graph.get(p) else {
            return false;
        };

        let (delta, consumed) = match b0 & 0x60 {
            0x60 => match (graph.get(p + 1), graph.get(p + 2)) {
                (Some(&b1), Some(&b2)) => (
                    (usize::from(b0 & 0x1f) << 16) | (usize::from(b1) << 8) | usize::from(b2),
                    3,
                ),
                _ => return false,
            },
            0x40 => match graph.get(p + 1) {
                Some(&b1) => ((usize::from(b0 & 0x1f) << 8) | usize::from(b1), 2),
                None => return false,
            },
            _ => (usize::from(b0 & 0x3f), 1),
        };

        *offset = offset.saturating_add(delta);
        *pos = if b0 & 0x80 != 0 { None } else { Some(p + consumed) };
        true
    }
}

impl TableDecoder for DafsaDecoder {
    fn lookup(&self, graph: &[u8], key: &[u8]) -> Option<u8> {
        // Graph chars are 7-bit; keys must be ASCII (punycode) already
        if !key.is_ascii() {
            return None;
        }

        let mut pos = Some(0usize);
        let mut offset = 0usize;
        let mut k = 0usize;

        while Self::next_offset(graph, &mut pos, &mut offset) {
            let mut did_consume = false;

            if k < key.len() && graph.get(offset)? & 0x80 == 0 {
                // Leading char is not a match, try the next child
                if graph[offset] != key[k] {
                    continue;
                }
                did_consume = true;
                offset += 1;
                k += 1;

                // A matching first char commits us to this label
                loop {
                    let b = *graph.get(offset)?;
                    if b & 0x80 != 0 || k == key.len() {
                        break;
                    }
                    if b != key[k] {
                        return None;
                    }
                    offset += 1;
                    k += 1;
                }
            }

            let b = *graph.get(offset)?;
            if k == key.len() {
                if b & 0xe0 == 0x80 {
                    return Some(b & 0x0f);
                }
                if did_consume {
                    return None;
                }
                continue;
            }

            if b != (key[k] | 0x80) {
                if did_consume {
                    return None;
                }
                continue;
            }

            // Dive into the child's offset list
            k += 1;
            offset += 1;
            pos = Some(offset);
        }

        None
    }

    fn utf_mode(&self, graph: &[u8]) -> bool {
        // Builders append a trailing byte below 0x80 when UTF-8 rules were encoded
        graph.last().is_some_and(|&b| b < 0x80)
    }
}

/// Oracle over a precompiled compact table buffer.
pub struct CompactTable {
    data: Vec<u8>,
    decoder: Box<dyn TableDecoder>,
}

impl CompactTable {
    /// Wrap `data` using the built-in DAFSA decoder.
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_decoder(data, Box::new(DafsaDecoder))
    }

    /// Wrap `data` using a caller-supplied decoder.
    pub fn with_decoder(data: Vec<u8>, decoder: Box<dyn TableDecoder>) -> Self {
        Self { data, decoder }
    }

    pub fn lookup(&self, key: &str) -> Option<Flags> {
        self.decoder
            .lookup(&self.data, key.as_bytes())
            .map(Flags::from_table_value)
    }

    /// Whether the table holds international (UTF-8 + punycode) rules.
    pub fn utf_mode(&self) -> bool {
        self.decoder.utf_mode(&self.data)
    }

    /// Size of the table payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for CompactTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompactTable")
            .field("size", &self.data.len())
            .finish_non_exhaustive()
    }
}
