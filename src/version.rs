//! Library version information.

use once_cell::sync::Lazy;

/// Major version of this library
pub const VERSION_MAJOR: u32 = parse_component(env!("CARGO_PKG_VERSION_MAJOR"));
/// Minor version of this library
pub const VERSION_MINOR: u32 = parse_component(env!("CARGO_PKG_VERSION_MINOR"));
/// Patch version of this library
pub const VERSION_PATCH: u32 = parse_component(env!("CARGO_PKG_VERSION_PATCH"));

/// Version packed as `0xMMmmpp`
pub const VERSION_NUMBER: u32 = pack(VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH);

static VERSION_STRING: Lazy<String> = Lazy::new(|| {
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        idna_backend()
    )
});

const fn parse_component(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

const fn pack(major: u32, minor: u32, patch: u32) -> u32 {
    (major & 0xff) << 16 | (minor & 0xff) << 8 | (patch & 0xff)
}

fn idna_backend() -> &'static str {
    if cfg!(feature = "idna") {
        "+idna"
    } else {
        "no IDNA support"
    }
}

/// Returns the packed library version.
pub fn version_number() -> u32 {
    VERSION_NUMBER
}

/// Check the library against a minimum required version.
///
/// Returns [`version_number()`] when this library is at least
/// `major.minor.patch`, and zero otherwise. The arguments are the caller's
/// minimum requirement, so asking for an older release succeeds and asking
/// for a newer one returns zero.
pub fn check_version_number(major: u32, minor: u32, patch: u32) -> u32 {
    let required = (major, minor, patch);
    let actual = (VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH);
    if required <= actual {
        VERSION_NUMBER
    } else {
        0
    }
}

/// Human-readable version string, including the IDNA backend.
pub fn get_version() -> &'static str {
    VERSION_STRING.as_str()
}

/// Path of the distribution rule file fixed at build time via
/// `HSTS_DISTFILE`, or an empty string.
pub fn dist_filename() -> &'static str {
    option_env!("HSTS_DISTFILE").unwrap_or("")
}
