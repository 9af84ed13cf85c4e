//! Dotted/indexed field addresses and the wildcard patterns that match them.
//!
//! An [Address] names a node's position in the field tree: identifier
//! segments separated by `.`, with unsigned integer segments addressing array
//! positions (`contacts.0.email`). The root address is the empty segment list
//! and renders as the empty string.
//!
//! A [Pattern] is a compiled matcher over address strings. `*` matches exactly
//! one segment, and a `*` embedded in a segment matches within that segment
//! (`addr*` matches `address`). A leading `.` marks the pattern as relative;
//! it resolves against a base address at compile time (see
//! [Pattern::parse_in]).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use regex::{escape as re_escape, Regex};

use crate::error::FormError;

/// One step of an [Address]: either a named key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn parse(raw: &str) -> Result<Segment, FormError> {
        if raw.is_empty() {
            return Err(FormError::InvalidPath(
                "empty path segment (consecutive or trailing '.')".to_string(),
            ));
        }
        match raw.parse::<usize>() {
            Ok(index) => Ok(Segment::Index(index)),
            Err(_) => Ok(Segment::Key(raw.to_string())),
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A resolved position in the field tree.
///
/// Immutable once built. [Address::parent] strictly shortens the segment list
/// and is a fixpoint at the root, so ancestor walks terminate in at most
/// depth steps.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    segments: Vec<Segment>,
}

impl Address {
    pub fn root() -> Address {
        Address::default()
    }

    /// Parse a dotted path string. The empty string is the root. Empty
    /// segments (leading, trailing, or doubled separators) are rejected.
    pub fn parse(raw: &str) -> Result<Address, FormError> {
        if raw.is_empty() {
            return Ok(Address::root());
        }
        let segments = raw
            .split('.')
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Address { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The containing address. The root is its own parent; callers detect
    /// exhaustion through [Address::is_root] / the empty string form.
    pub fn parent(&self) -> Address {
        let mut segments = self.segments.clone();
        segments.pop();
        Address { segments }
    }

    /// Append one segment, yielding a child address.
    pub fn join(&self, segment: Segment) -> Address {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Address { segments }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .segments
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{rendered}")
    }
}

impl TryFrom<String> for Address {
    type Error = FormError;
    fn try_from(raw: String) -> Result<Address, FormError> {
        Address::parse(&raw)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> String {
        address.to_string()
    }
}

/// Compiled matcher over canonical path strings.
///
/// Matching is segment-aligned: `a.*` matches `a.b` and `a.0` but not
/// `a.b.c`. A node matches when the pattern accepts either its address or
/// its alias-resolved canonical path (the "alias group" test).
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    matcher: Regex,
}

impl Pattern {
    /// Compile an absolute pattern. A leading `.` resolves against the root,
    /// so `.a.b` and `a.b` are equivalent here.
    pub fn parse(source: &str) -> Result<Pattern, FormError> {
        Pattern::parse_in(source, &Address::root())
    }

    /// Compile a pattern relative to `base`. Only patterns with a leading
    /// `.` are treated as relative; anything else resolves from the root.
    pub fn parse_in(source: &str, base: &Address) -> Result<Pattern, FormError> {
        let effective = match source.strip_prefix('.') {
            Some(rest) if base.is_root() => rest.to_string(),
            Some(rest) if rest.is_empty() => base.to_string(),
            Some(rest) => format!("{base}.{rest}"),
            None => source.to_string(),
        };
        if effective.is_empty() {
            return Err(FormError::InvalidPath("empty pattern".to_string()));
        }
        let mut pieces = Vec::new();
        for segment in effective.split('.') {
            if segment.is_empty() {
                return Err(FormError::InvalidPath(format!(
                    "empty segment in pattern '{source}'"
                )));
            }
            if segment == "*" {
                pieces.push("[^.]+".to_string());
            } else if segment.contains('*') {
                let partial = segment
                    .split('*')
                    .map(re_escape)
                    .collect::<Vec<_>>()
                    .join("[^.]*");
                pieces.push(partial);
            } else {
                pieces.push(re_escape(segment));
            }
        }
        let matcher = Regex::new(&format!("^{}$", pieces.join("\\.")))?;
        tracing::trace!("compiled pattern '{}' as {}", source, matcher.as_str());
        Ok(Pattern {
            source: source.to_string(),
            matcher,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Test a concrete path string.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Test a node's alias group: the pattern matches when it accepts either
    /// the physical address or the alias-resolved canonical path.
    pub fn match_alias_group(&self, address: &Address, path: &Address) -> bool {
        self.matches(&address.to_string()) || self.matches(&path.to_string())
    }
}
