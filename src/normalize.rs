//! Label normalization.
//!
//! The engine itself compares suffixes byte for byte. International rules
//! are registered a second time in their ASCII-compatible (punycode) form
//! through an [`AsciiEncoder`], so callers can look up either form.

/// Converts a normalized suffix into its ASCII-compatible form.
pub trait AsciiEncoder: Send + Sync {
    /// Returns the ASCII form of `suffix`, or `None` if it cannot be encoded.
    fn to_ascii(&self, suffix: &str) -> Option<String>;
}

/// Encoder that never converts anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEncoder;

impl AsciiEncoder for NoopEncoder {
    fn to_ascii(&self, _suffix: &str) -> Option<String> {
        None
    }
}

/// UTS #46 / punycode encoder backed by the `idna` crate
#[cfg(feature = "idna")]
#[derive(Debug, Clone, Copy, Default)]
pub struct IdnaEncoder;

#[cfg(feature = "idna")]
impl AsciiEncoder for IdnaEncoder {
    fn to_ascii(&self, suffix: &str) -> Option<String> {
        idna::domain_to_ascii(suffix).ok()
    }
}

/// Encoder used when the caller does not supply one.
pub fn default_encoder() -> &'static dyn AsciiEncoder {
    #[cfg(feature = "idna")]
    {
        &IdnaEncoder
    }
    #[cfg(not(feature = "idna"))]
    {
        &NoopEncoder
    }
}

/// Bring a domain into the form rules are looked up in: lowercase, and
/// punycode for international labels when IDNA support is compiled in.
///
/// A single leading dot is kept; the search strips it.
pub fn to_lookup_form(domain: &str) -> String {
    let (dot, rest) = match domain.strip_prefix('.') {
        Some(rest) => (".", rest),
        None => ("", domain),
    };

    if rest.is_ascii() {
        return format!("{dot}{}", rest.to_ascii_lowercase());
    }

    match default_encoder().to_ascii(rest) {
        Some(ascii) => format!("{dot}{ascii}"),
        None => format!("{dot}{}", rest.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_encoder() {
        assert_eq!(NoopEncoder.to_ascii("例え.jp"), None);
    }

    #[test]
    fn test_lookup_form_ascii() {
        assert_eq!(to_lookup_form("WWW.Example.COM"), "www.example.com");
        assert_eq!(to_lookup_form(".Example.com"), ".example.com");
        assert_eq!(to_lookup_form(""), "");
    }

    #[cfg(feature = "idna")]
    #[test]
    fn test_idna_encoder_punycodes() {
        assert_eq!(
            IdnaEncoder.to_ascii("bücher.de").as_deref(),
            Some("xn--bcher-kva.de")
        );
        assert_eq!(to_lookup_form("Bücher.DE"), "xn--bcher-kva.de");
    }

    #[cfg(feature = "idna")]
    #[test]
    fn test_idna_encoder_keeps_ascii() {
        assert_eq!(IdnaEncoder.to_ascii("co.uk").as_deref(), Some("co.uk"));
    }
}
