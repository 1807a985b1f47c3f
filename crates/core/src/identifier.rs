//! Handle grammar
//!
//! A handle is `prefix/suffix[.version]`:
//!
//! - `prefix`: the naming authority, ASCII digits optionally separated by
//!   single dots (`123456789`, `20.500.12345`)
//! - `suffix`: everything after the first slash, non-empty, no whitespace
//! - `version`: a positive integer without leading zeros after the final dot
//!   of the suffix
//!
//! The canonical string omits the version when it is absent or `1`, so the
//! first version of a lineage keeps its unversioned handle and version `N > 1`
//! is rendered as `prefix/suffix.N`.
//!
//! Everything in this module is pure. [`Handle::parse`] is total: it never
//! panics, and `Handle::parse(&h.to_string()) == Ok(h)` for every `Handle`
//! that can be constructed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// Global handle resolver
pub const GLOBAL_RESOLVER: &str = "http://hdl.handle.net/";

/// Global handle resolver over TLS
pub const GLOBAL_RESOLVER_TLS: &str = "https://hdl.handle.net/";

/// URI scheme forms accepted in front of a bare handle
const SCHEME_FORMS: [&str; 2] = ["hdl:", "info:hdl/"];

const DOT: char = '.';
const SLASH: char = '/';

/// Position of a snapshot within its lineage
///
/// Always >= 1. Version 1 is the first snapshot and carries the bare handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionNumber(NonZeroU32);

impl VersionNumber {
    /// The first version of every lineage
    pub const FIRST: VersionNumber = VersionNumber(NonZeroU32::MIN);

    /// Create a version number (returns `None` for zero)
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Raw value (always >= 1)
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Whether this is version 1
    #[inline]
    pub const fn is_first(self) -> bool {
        self.0.get() == 1
    }

    /// The following version number, saturating at `u32::MAX`
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Reasons a string is not a handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleParseError {
    /// No `/` separating prefix and suffix
    #[error("handle has no '/' separating prefix and suffix")]
    MissingSlash,

    /// Nothing before the slash
    #[error("handle prefix is empty")]
    EmptyPrefix,

    /// Prefix is not a dotted run of digits
    #[error("invalid handle prefix '{0}'")]
    InvalidPrefix(String),

    /// Nothing after the slash
    #[error("handle suffix is empty")]
    EmptySuffix,

    /// Whitespace anywhere in the text
    #[error("handle contains whitespace")]
    Whitespace,

    /// A version was requested for a suffix that cannot carry one
    #[error("handle suffix '{0}' cannot carry a version")]
    UnversionableSuffix(String),
}

/// A structured handle
///
/// Construct with [`Handle::new`], [`Handle::parse`] or `str::parse`. The
/// stored form is always normalized: version `1` is dropped and a trailing
/// `.N` in the suffix is lifted into the version, so derived equality
/// coincides with canonical-string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    prefix: String,
    suffix: String,
    version: Option<VersionNumber>,
}

impl Handle {
    /// Build a handle from its parts
    ///
    /// The parts are validated and normalized through the canonical string,
    /// so `Handle::new("1", "100.5", None)` equals
    /// `Handle::new("1", "100", VersionNumber::new(5))`.
    ///
    /// A version other than 1 on a suffix ending in `/` is rejected with
    /// `UnversionableSuffix`, since `a/.2` does not parse back as version 2.
    pub fn new(
        prefix: &str,
        suffix: &str,
        version: Option<VersionNumber>,
    ) -> Result<Self, HandleParseError> {
        validate_prefix(prefix)?;
        if suffix.is_empty() {
            return Err(HandleParseError::EmptySuffix);
        }
        match version {
            Some(v) if !v.is_first() => {
                let handle = Self::parse(&format!("{prefix}{SLASH}{suffix}{DOT}{v}"))?;
                if handle.version != Some(v) {
                    return Err(HandleParseError::UnversionableSuffix(suffix.to_string()));
                }
                Ok(handle)
            }
            _ => Self::parse(&format!("{prefix}{SLASH}{suffix}")),
        }
    }

    /// Parse a bare handle string
    pub fn parse(text: &str) -> Result<Self, HandleParseError> {
        if text.chars().any(char::is_whitespace) {
            return Err(HandleParseError::Whitespace);
        }
        let (prefix, rest) = text
            .split_once(SLASH)
            .ok_or(HandleParseError::MissingSlash)?;
        validate_prefix(prefix)?;
        if rest.is_empty() {
            return Err(HandleParseError::EmptySuffix);
        }

        // `.1` names the first version, whose canonical form is the stem
        let mut suffix = rest;
        let mut version = None;
        while let Some((stem, v)) = split_version(suffix) {
            suffix = stem;
            if !v.is_first() {
                version = Some(v);
                break;
            }
        }

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            version,
        })
    }

    /// Naming authority
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Local name without the version
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Version ordinal, `None` for unversioned and first-version handles
    pub fn version(&self) -> Option<VersionNumber> {
        self.version
    }

    /// Version this handle denotes within its lineage (1 when unversioned)
    pub fn version_or_first(&self) -> VersionNumber {
        self.version.unwrap_or(VersionNumber::FIRST)
    }

    /// Same prefix and suffix without any version
    pub fn bare(&self) -> Handle {
        Handle {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            version: None,
        }
    }

    /// Same prefix and suffix at version `version`
    pub fn at_version(&self, version: VersionNumber) -> Handle {
        Handle {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            version: Some(version).filter(|v| !v.is_first()),
        }
    }

    /// Canonical string form
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{}{SLASH}{}{DOT}{}", self.prefix, self.suffix, v),
            None => write!(f, "{}{SLASH}{}", self.prefix, self.suffix),
        }
    }
}

impl FromStr for Handle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::parse(s)
    }
}

impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Handle::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn validate_prefix(prefix: &str) -> Result<(), HandleParseError> {
    if prefix.is_empty() {
        return Err(HandleParseError::EmptyPrefix);
    }
    let well_formed = prefix
        .split(DOT)
        .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()));
    if well_formed {
        Ok(())
    } else {
        Err(HandleParseError::InvalidPrefix(prefix.to_string()))
    }
}

/// Whether `prefix` is a well-formed naming authority
pub fn is_valid_prefix(prefix: &str) -> bool {
    validate_prefix(prefix).is_ok()
}

/// Split `stem.N` where `N` is a positive integer without leading zeros.
fn split_version(segment: &str) -> Option<(&str, VersionNumber)> {
    let (stem, digits) = segment.rsplit_once(DOT)?;
    if stem.is_empty() || stem.ends_with(SLASH) || digits.is_empty() || digits.starts_with('0') {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n = digits.parse::<u32>().ok()?;
    VersionNumber::new(n).map(|v| (stem, v))
}

/// Version encoded in a handle string, if any
///
/// Matches "a slash, then a dot-separated positive integer after the final
/// slash-delimited segment". Works on any text, well-formed prefix or not.
///
/// ```
/// use handlemint_core::identifier::version_suffix;
///
/// assert_eq!(version_suffix("123456789/100.4").map(|v| v.get()), Some(4));
/// assert_eq!(version_suffix("123456789/100"), None);
/// assert_eq!(version_suffix("100.4"), None);
/// ```
pub fn version_suffix(text: &str) -> Option<VersionNumber> {
    let (head, last) = text.rsplit_once(SLASH)?;
    if head.is_empty() {
        return None;
    }
    split_version(last).map(|(_, v)| v)
}

/// Drop a trailing `.N` version from a handle string
pub fn strip_version_suffix(text: &str) -> &str {
    match version_suffix(text) {
        Some(_) => text.rsplit_once(DOT).map(|(stem, _)| stem).unwrap_or(text),
        None => text,
    }
}

/// Render `bare` at `version`: unchanged for version 1, `bare.N` otherwise
pub fn versioned_form(bare: &str, version: VersionNumber) -> String {
    let bare = strip_version_suffix(bare);
    if version.is_first() {
        bare.to_string()
    } else {
        format!("{bare}{DOT}{version}")
    }
}

/// Normalize any accepted spelling of a handle to its canonical string
///
/// Accepts a bare handle, the `hdl:` and `info:hdl/` schemes, the global
/// resolver (`http://` and `https://`) and the repository's own
/// `canonical_prefix`. Returns `None` for anything else.
pub fn normalize(text: &str, canonical_prefix: &str) -> Option<String> {
    let text = text.trim();
    let resolvers = [canonical_prefix, GLOBAL_RESOLVER, GLOBAL_RESOLVER_TLS];
    let bare = resolvers
        .iter()
        .chain(SCHEME_FORMS.iter())
        .filter(|p| !p.is_empty())
        .find_map(|p| text.strip_prefix(p))
        .unwrap_or(text);
    Handle::parse(bare).ok().map(|h| h.to_string())
}

/// Fully-qualified resolvable form of a handle
pub fn resolvable_form(canonical_prefix: &str, handle: &str) -> String {
    if handle.trim().is_empty() {
        return String::new();
    }
    format!("{canonical_prefix}{handle}")
}

/// Last two path segments of a URL, joined by a slash
///
/// `http://hdl.handle.net/123456789/100` yields `123456789/100`.
pub fn handle_from_url(url: &str) -> Option<String> {
    let mut segments = url.rsplit(SLASH);
    let suffix = segments.next()?;
    let prefix = segments.next()?;
    if prefix.is_empty() || suffix.is_empty() {
        return None;
    }
    Some(format!("{prefix}{SLASH}{suffix}"))
}
