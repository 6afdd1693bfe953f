//! Safe artifact loader.
//!
//! Reads an untrusted compact table artifact into memory. The header is
//! checked before anything else is read, the payload buffer grows by
//! doubling from a generous initial capacity, and a hard ceiling bounds
//! how much memory a hostile stream can make us allocate.

use std::io::{ErrorKind, Read};

use crate::error::{HstsError, Result};
use crate::oracle::{CompactTable, DafsaDecoder, TableDecoder};

/// Format tag at the start of every compact artifact
pub const HEADER_TAG: &[u8] = b".DAFSA@HSTS_";

/// Header length: tag, 3-byte version field, newline
pub const HEADER_LEN: usize = 16;

/// The only artifact version this engine reads
pub const SUPPORTED_VERSION: u32 = 0;

/// Default initial payload capacity (historical artifact size)
pub const DEFAULT_INITIAL_CAPACITY: usize = 64 * 1024;

/// Default hard ceiling on input size
pub const DEFAULT_MAX_SIZE: usize = 32 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// Loader options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Capacity reserved before the first read
    pub initial_capacity: usize,
    /// Inputs larger than this fail with `TooLarge`
    pub max_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl LoadOptions {
    /// Create new loader options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hard size ceiling.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the initial buffer capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

/// Check whether `line` looks like a compact artifact header, without
/// validating the version.
pub fn is_header(line: &[u8]) -> bool {
    line.len() == HEADER_LEN && line.starts_with(HEADER_TAG) && line[HEADER_LEN - 1] == b'\n'
}

/// Validate a header and return its version.
pub fn parse_header(header: &[u8]) -> Result<u32> {
    if !is_header(header) {
        return Err(HstsError::Format(
            "missing .DAFSA@HSTS_ artifact header".to_string(),
        ));
    }

    let field = &header[HEADER_TAG.len()..HEADER_LEN - 1];
    let digits = match field.iter().position(|&b| b == b' ') {
        Some(end) if field[end..].iter().all(|&b| b == b' ') => &field[..end],
        Some(_) => {
            return Err(HstsError::Format(
                "malformed artifact version field".to_string(),
            ))
        }
        None => field,
    };

    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(HstsError::Format(
            "malformed artifact version field".to_string(),
        ));
    }

    // At most three ASCII digits, always fits
    let version = digits
        .iter()
        .fold(0u32, |acc, &d| acc * 10 + u32::from(d - b'0'));

    if version != SUPPORTED_VERSION {
        return Err(HstsError::UnsupportedVersion(version));
    }
    Ok(version)
}

/// Read and validate the fixed-size header.
pub fn read_header<R: Read>(reader: &mut R) -> Result<u32> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            HstsError::Format("stream shorter than artifact header".to_string())
        } else {
            HstsError::Io(e)
        }
    })?;
    parse_header(&header)
}

/// Read the rest of `reader` into an exactly-sized buffer.
///
/// Fails with `TooLarge` as soon as the total would exceed
/// `options.max_size`; the partial buffer is dropped before returning.
pub fn read_payload<R: Read>(reader: &mut R, options: &LoadOptions) -> Result<Vec<u8>> {
    let limit = options.max_size;
    let mut buf = Vec::new();
    reserve_to(&mut buf, options.initial_capacity.min(limit))?;

    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(HstsError::Io(e)),
        };

        let needed = buf.len() + n;
        if needed > limit {
            tracing::warn!(limit, "artifact exceeds size ceiling");
            return Err(HstsError::TooLarge { limit });
        }

        if needed > buf.capacity() {
            let mut capacity = buf.capacity().max(READ_CHUNK);
            while capacity < needed {
                capacity = capacity.saturating_mul(2);
            }
            reserve_to(&mut buf, capacity.min(limit))?;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    buf.shrink_to_fit();
    Ok(buf)
}

fn reserve_to(buf: &mut Vec<u8>, capacity: usize) -> Result<()> {
    let additional = capacity.saturating_sub(buf.len());
    buf.try_reserve_exact(additional)
        .map_err(|_| HstsError::OutOfMemory(capacity))
}

/// Load a compact table artifact with the built-in DAFSA decoder.
pub fn load_binary<R: Read>(reader: R, options: &LoadOptions) -> Result<CompactTable> {
    load_binary_with_decoder(reader, options, Box::new(DafsaDecoder))
}

/// Load a compact table artifact, decoding it with `decoder`.
pub fn load_binary_with_decoder<R: Read>(
    mut reader: R,
    options: &LoadOptions,
    decoder: Box<dyn TableDecoder>,
) -> Result<CompactTable> {
    let version = read_header(&mut reader)?;
    let payload = read_payload(&mut reader, options)?;
    tracing::debug!(version, size = payload.len(), "loaded compact table");
    Ok(CompactTable::with_decoder(payload, decoder))
}
