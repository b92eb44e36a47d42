//! Content-based MIME type rules.
//!
//! The declared `Content-Type` of an upload is chosen by the client, so the
//! rules here never look at it. The type is detected from the leading bytes
//! of the stored object with [`infer`], which matches file signatures
//! (magic numbers):
//!
//! ```text
//! FF D8 FF ...               -> image/jpeg
//! 89 50 4E 47 0D 0A 1A 0A    -> image/png
//! 25 50 44 46 2D ("%PDF-")   -> application/pdf
//! ```
//!
//! Content no signature matches falls back to `application/x-empty`,
//! `text/plain` or `application/octet-stream`.

use std::fmt;

use async_trait::async_trait;
use regex::Regex;
use sluice_core::{ObjectHandle, ObjectStore};
use tracing::trace;

use crate::error::{ArgumentError, ValidationError};
use crate::validator::Validator;

/// Number of leading bytes read for detection.
pub const SNIFF_LEN: usize = 8192;

/// Detect the MIME type of `data`.
///
/// # Examples
///
/// ```
/// use sluice_validation::mime::detect_mime;
///
/// assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
/// assert_eq!(detect_mime(b"hello"), "text/plain");
/// assert_eq!(detect_mime(b""), "application/x-empty");
/// ```
#[must_use]
pub fn detect_mime(data: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type();
    }
    if data.is_empty() {
        "application/x-empty"
    } else if looks_like_text(data) {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

/// UTF-8 without NUL bytes. A multi-byte sequence cut off at the end of a
/// truncated read still counts as text.
fn looks_like_text(data: &[u8]) -> bool {
    if data.contains(&0) {
        return false;
    }
    match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

async fn sniff(
    object: &ObjectHandle,
    store: &dyn ObjectStore,
) -> Result<&'static str, ValidationError> {
    let head = store.read_object_prefix(object.key(), SNIFF_LEN).await?;
    let detected = detect_mime(&head);
    trace!(key = object.key(), detected, "detected MIME type");
    Ok(detected)
}

/// Which types a rule refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeSelector {
    Single(String),
    Set(Vec<String>),
}

impl TypeSelector {
    fn contains(&self, mime_type: &str) -> bool {
        match self {
            Self::Single(expected) => expected == mime_type,
            Self::Set(types) => types.iter().any(|t| t == mime_type),
        }
    }
}

impl fmt::Display for TypeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(mime_type) => f.write_str(mime_type),
            Self::Set(types) => write!(f, "[{}]", types.join(", ")),
        }
    }
}

/// A pattern matched from the start of the detected type.
#[derive(Clone)]
struct TypePattern {
    source: String,
    regex: Regex,
}

impl fmt::Debug for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.source, f)
    }
}

impl TypePattern {
    fn new(source: &str) -> Result<Self, ArgumentError> {
        Ok(Self {
            source: source.to_owned(),
            regex: Regex::new(&format!("^(?:{source})"))?,
        })
    }

    fn is_match(&self, mime_type: &str) -> bool {
        self.regex.is_match(mime_type)
    }
}

/// The selection shared by allow and deny rules.
#[derive(Debug, Clone)]
struct MimeRule {
    types: Option<TypeSelector>,
    pattern: Option<TypePattern>,
}

impl MimeRule {
    /// A type set wins over a single type when both are given.
    fn new(
        mime_type: Option<&str>,
        mime_types: Option<Vec<String>>,
        regex: Option<&str>,
    ) -> Result<Self, ArgumentError> {
        let types = match (mime_types, mime_type) {
            (Some(set), _) => Some(TypeSelector::Set(set)),
            (None, Some(single)) => Some(TypeSelector::Single(single.to_owned())),
            (None, None) => None,
        };
        let pattern = regex.map(TypePattern::new).transpose()?;
        if types.is_none() && pattern.is_none() {
            return Err(ArgumentError::MissingMimeSelector);
        }
        Ok(Self { types, pattern })
    }
}

/// Allow-list of MIME types.
///
/// # Examples
///
/// ```
/// use sluice_validation::MimeType;
///
/// let jpeg = MimeType::exact("image/jpeg");
/// let web_images = MimeType::any_of(["image/png", "image/jpeg", "image/gif"]);
/// let images = MimeType::matching(r"image/.*").unwrap();
/// assert!(MimeType::new(None, None, None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MimeType {
    rule: MimeRule,
}

impl MimeType {
    /// Create a rule from any combination of a single type, a type set and a
    /// pattern. The set takes precedence over the single type.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MissingMimeSelector`] when nothing is given
    /// and [`ArgumentError::InvalidRegex`] when the pattern does not compile.
    pub fn new(
        mime_type: Option<&str>,
        mime_types: Option<Vec<String>>,
        regex: Option<&str>,
    ) -> Result<Self, ArgumentError> {
        Ok(Self {
            rule: MimeRule::new(mime_type, mime_types, regex)?,
        })
    }

    /// Accept exactly `mime_type`.
    #[must_use]
    pub fn exact(mime_type: impl Into<String>) -> Self {
        Self {
            rule: MimeRule {
                types: Some(TypeSelector::Single(mime_type.into())),
                pattern: None,
            },
        }
    }

    /// Accept any of `mime_types`.
    #[must_use]
    pub fn any_of<I, S>(mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule: MimeRule {
                types: Some(TypeSelector::Set(
                    mime_types.into_iter().map(Into::into).collect(),
                )),
                pattern: None,
            },
        }
    }

    /// Accept types matching `pattern` from the start.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::InvalidRegex`] when the pattern does not
    /// compile.
    pub fn matching(pattern: &str) -> Result<Self, ArgumentError> {
        Ok(Self {
            rule: MimeRule {
                types: None,
                pattern: Some(TypePattern::new(pattern)?),
            },
        })
    }

    /// Check a detected type against the rule. The pattern is checked first.
    pub fn check(&self, detected: &str) -> Result<(), ValidationError> {
        if let Some(pattern) = &self.rule.pattern {
            if !pattern.is_match(detected) {
                return Err(ValidationError::invalid(format!(
                    "File MIME type {detected} does not match regex {}.",
                    pattern.source
                )));
            }
        }
        match &self.rule.types {
            Some(TypeSelector::Single(expected)) if expected != detected => Err(
                ValidationError::invalid(format!("File MIME type is {detected}, not in {expected}.")),
            ),
            Some(types @ TypeSelector::Set(_)) if !types.contains(detected) => Err(
                ValidationError::invalid(format!("File MIME type is {detected}, not in {types}.")),
            ),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Validator for MimeType {
    async fn validate(
        &self,
        object: &ObjectHandle,
        store: &dyn ObjectStore,
    ) -> Result<(), ValidationError> {
        let detected = sniff(object, store).await?;
        self.check(detected)
    }
}

/// Deny-list of MIME types.
///
/// # Examples
///
/// ```
/// use sluice_validation::DenyMimeType;
///
/// let no_executables = DenyMimeType::any_of([
///     "application/x-executable",
///     "application/vnd.microsoft.portable-executable",
/// ]);
/// assert!(no_executables.check("image/png").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct DenyMimeType {
    rule: MimeRule,
}

impl DenyMimeType {
    /// Create a rule from any combination of a single type, a type set and a
    /// pattern. The set takes precedence over the single type.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MissingMimeSelector`] when nothing is given
    /// and [`ArgumentError::InvalidRegex`] when the pattern does not compile.
    pub fn new(
        mime_type: Option<&str>,
        mime_types: Option<Vec<String>>,
        regex: Option<&str>,
    ) -> Result<Self, ArgumentError> {
        Ok(Self {
            rule: MimeRule::new(mime_type, mime_types, regex)?,
        })
    }

    /// Deny exactly `mime_type`.
    #[must_use]
    pub fn exact(mime_type: impl Into<String>) -> Self {
        Self {
            rule: MimeRule {
                types: Some(TypeSelector::Single(mime_type.into())),
                pattern: None,
            },
        }
    }

    /// Deny each of `mime_types`.
    #[must_use]
    pub fn any_of<I, S>(mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule: MimeRule {
                types: Some(TypeSelector::Set(
                    mime_types.into_iter().map(Into::into).collect(),
                )),
                pattern: None,
            },
        }
    }

    /// Deny types matching `pattern` from the start.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::InvalidRegex`] when the pattern does not
    /// compile.
    pub fn matching(pattern: &str) -> Result<Self, ArgumentError> {
        Ok(Self {
            rule: MimeRule {
                types: None,
                pattern: Some(TypePattern::new(pattern)?),
            },
        })
    }

    /// Check a detected type against the rule. The pattern is checked first.
    pub fn check(&self, detected: &str) -> Result<(), ValidationError> {
        if let Some(pattern) = &self.rule.pattern {
            if pattern.is_match(detected) {
                return Err(ValidationError::invalid(format!(
                    "File MIME type {detected} matches denied regex {}.",
                    pattern.source
                )));
            }
        }
        match &self.rule.types {
            Some(types) if types.contains(detected) => Err(ValidationError::invalid(format!(
                "File MIME type {detected} is in denied list {types}."
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Validator for DenyMimeType {
    async fn validate(
        &self,
        object: &ObjectHandle,
        store: &dyn ObjectStore,
    ) -> Result<(), ValidationError> {
        let detected = sniff(object, store).await?;
        self.check(detected)
    }
}
