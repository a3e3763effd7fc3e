//! URI addressor.
//!
//! Maps a request path and query onto the resource being asked for:
//!
//! ```text
//! /cimrs/test%2FTestProvider/cmpiPerf_TestClassB             collection
//! /cimrs/test%2FTestProvider/cmpiPerf_TestClassB?IncludeQualifiers=true
//!                                                            class
//! /cimrs/test%2FTestProvider/cmpiPerf_TestClassB/17          instance
//! ```
//!
//! The namespace occupies a single path segment with its `/` separators
//! percent-encoded. A multi-key instance segment joins the key literals with
//! `+`, ordered by key name case-insensitively.

use cimrs_kernel::model::{ClassName, Namespace};
use std::borrow::Cow;
use thiserror::Error;

/// Root segment used when none is configured.
pub const DEFAULT_ROOT: &str = "cimrs";

/// Separator between key literals in an instance segment.
pub const KEY_SEPARATOR: char = '+';

/// Unit of the `Range` and `Content-Range` headers on collection reads.
pub const RANGE_UNIT: &str = "items";

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// A request URI that does not address a resource.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AddressError {
    #[error("path must start with '/{expected}', found '/{found}'")]
    WrongRoot { expected: String, found: String },

    #[error("missing {0} segment")]
    MissingSegment(&'static str),

    #[error("empty path segment")]
    EmptySegment,

    #[error("unexpected path segment '{0}' after the instance key")]
    ExtraSegment(String),

    #[error("malformed percent-encoding in '{0}'")]
    BadEncoding(String),

    #[error("invalid value '{value}' for option {name}")]
    InvalidOption { name: String, value: String },

    /// Raised by the resolver when key literals do not fit the class keys.
    #[error("invalid instance key: {0}")]
    InvalidKey(String),

    #[error("invalid Range header '{0}', expected 'items=<first>-[<last>]'")]
    InvalidRange(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Address
// ─────────────────────────────────────────────────────────────────────────────

/// Which representation the request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Class,
    Collection,
    Instance,
}

/// A parsed request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAddress {
    pub kind: RequestKind,
    pub namespace: Namespace,
    pub class_name: ClassName,
    /// Decoded key literals in URI order. `Some` only for instance requests.
    pub key: Option<Vec<String>>,
}

/// Query-string options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// `IncludeQualifiers=true`: return class metadata with qualifiers.
    pub include_qualifiers: bool,
    /// `DeepInheritance=true`: collections include subclass instances.
    pub deep_inheritance: bool,
    /// `properties=a,b`: restrict instance properties to this list.
    pub properties: Option<Vec<String>>,
    /// `Range: items=first-last` header: serve only part of a collection.
    pub range: Option<ItemRange>,
}

/// Zero-based, inclusive window over a collection.
///
/// `items=10-19` selects the eleventh to twentieth member, `items=10-`
/// everything from the eleventh on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRange {
    pub first: usize,
    pub last: Option<usize>,
}

impl ItemRange {
    /// Parse a `Range` header value.
    pub fn parse(header: &str) -> Result<Self, AddressError> {
        let invalid = || AddressError::InvalidRange(header.to_string());

        let (unit, spec) = header.trim().split_once('=').ok_or_else(invalid)?;
        if !unit.trim().eq_ignore_ascii_case(RANGE_UNIT) {
            return Err(invalid());
        }
        let (first, last) = spec.trim().split_once('-').ok_or_else(invalid)?;
        let first: usize = first.trim().parse().map_err(|_| invalid())?;
        let last = match last.trim() {
            "" => None,
            last => Some(last.parse::<usize>().map_err(|_| invalid())?),
        };
        if last.is_some_and(|last| last < first) {
            return Err(invalid());
        }
        Ok(Self { first, last })
    }
}

impl RequestOptions {
    /// Parse the raw (still percent-encoded) query string.
    ///
    /// Option names match case-insensitively and unknown options are
    /// ignored. Boolean options accept only `true` or `false`.
    pub fn from_query(query: Option<&str>) -> Result<Self, AddressError> {
        let mut options = Self::default();
        let Some(query) = query else {
            return Ok(options);
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode(raw_name)?;
            let value = decode(raw_value)?;

            if name.eq_ignore_ascii_case("IncludeQualifiers") {
                options.include_qualifiers = parse_bool(&name, &value)?;
            } else if name.eq_ignore_ascii_case("DeepInheritance") {
                options.deep_inheritance = parse_bool(&name, &value)?;
            } else if name.eq_ignore_ascii_case("properties") {
                options.properties = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
        }
        Ok(options)
    }

    /// `true` when the property should appear in an instance representation.
    pub fn selects(&self, property: &str) -> bool {
        match &self.properties {
            None => true,
            Some(list) => list.iter().any(|p| p.eq_ignore_ascii_case(property)),
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, AddressError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(AddressError::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a request below the default `cimrs` root.
pub fn parse(path: &str, query: Option<&str>) -> Result<ResourceAddress, AddressError> {
    parse_request(DEFAULT_ROOT, path, query).map(|(address, _)| address)
}

/// Parse the raw request path and query below `root`.
///
/// `path` must still be percent-encoded so that an encoded `/` inside the
/// namespace is not mistaken for a segment boundary.
pub fn parse_request(
    root: &str,
    path: &str,
    query: Option<&str>,
) -> Result<(ResourceAddress, RequestOptions), AddressError> {
    let options = RequestOptions::from_query(query)?;

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let mut segments = trimmed.split('/');

    let first = segments.next().unwrap_or_default();
    if first != root {
        return Err(AddressError::WrongRoot {
            expected: root.to_string(),
            found: first.to_string(),
        });
    }

    let namespace = required(segments.next(), "namespace")?;
    let class = required(segments.next(), "class")?;
    let key = segments.next().map(|k| required(Some(k), "key")).transpose()?;
    if let Some(extra) = segments.next() {
        return Err(AddressError::ExtraSegment(extra.to_string()));
    }

    let namespace = decode_namespace(namespace)?;
    let class_name = ClassName::new(decode(class)?);
    let key = key.map(split_key).transpose()?;

    let kind = match (&key, options.include_qualifiers) {
        (Some(_), _) => RequestKind::Instance,
        (None, true) => RequestKind::Class,
        (None, false) => RequestKind::Collection,
    };

    Ok((
        ResourceAddress {
            kind,
            namespace,
            class_name,
            key,
        },
        options,
    ))
}

fn required<'a>(segment: Option<&'a str>, what: &'static str) -> Result<&'a str, AddressError> {
    match segment {
        None => Err(AddressError::MissingSegment(what)),
        Some("") => Err(AddressError::EmptySegment),
        Some(s) => Ok(s),
    }
}

/// Split a raw key segment on `+`, then decode each literal, so that an
/// encoded `%2B` stays part of its literal.
fn split_key(segment: &str) -> Result<Vec<String>, AddressError> {
    segment
        .split(KEY_SEPARATOR)
        .map(|literal| decode(literal).map(Cow::into_owned))
        .collect()
}

/// Decode a namespace path segment (`test%2FTestProvider`).
pub fn decode_namespace(segment: &str) -> Result<Namespace, AddressError> {
    let decoded = decode(segment)?;
    if decoded.is_empty() {
        return Err(AddressError::EmptySegment);
    }
    Ok(Namespace::new(decoded))
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape and
/// the result must be UTF-8.
fn decode(raw: &str) -> Result<Cow<'_, str>, AddressError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(AddressError::BadEncoding(raw.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    urlencoding::decode(raw).map_err(|_| AddressError::BadEncoding(raw.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Building
// ─────────────────────────────────────────────────────────────────────────────

/// Encode a namespace into a single path segment.
pub fn encode_namespace(namespace: &Namespace) -> String {
    urlencoding::encode(namespace.as_str()).into_owned()
}

/// Join key literals into an instance segment.
pub fn key_ref<S: AsRef<str>>(literals: &[S]) -> String {
    literals
        .iter()
        .map(|l| urlencoding::encode(l.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

/// `/<root>/<namespace>/<class>`
pub fn class_path(root: &str, namespace: &Namespace, class: &ClassName) -> String {
    format!(
        "/{root}/{}/{}",
        encode_namespace(namespace),
        urlencoding::encode(class.as_str())
    )
}

/// `/<root>/<namespace>/<class>/<key_ref>`
pub fn instance_path(root: &str, namespace: &Namespace, class: &ClassName, key_ref: &str) -> String {
    format!("{}/{key_ref}", class_path(root, namespace, class))
}
