//! Host collaborators injected into the loader and the dumper.
//!
//! The bridge never inspects host objects itself. Anything that needs host
//! knowledge (compiling a pattern, describing a callable, turning an opaque
//! handle into plain structure) goes through one of these traits. They are
//! held as `Arc<dyn ...>` in [`LoaderConfig`](crate::config::LoaderConfig)
//! and [`DumperConfig`](crate::config::DumperConfig).

use std::any::Any;

use bytes::Bytes;
use regex::Regex;
use thiserror::Error;

use crate::value::Document;

/// Failure to build a pattern from its source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PatternError {
    pub reason: String,
}

impl PatternError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Builds the host representation of a `regexp` scalar.
///
/// The returned bytes become the payload of `Typed{regexp, ..}`.
pub trait PatternFactory: Send + Sync {
    fn construct(
        &self,
        source: &[u8],
    ) -> Result<Bytes, PatternError>;
}

/// Validates the pattern with the `regex` crate and keeps the source text
/// unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexPatternFactory;

impl PatternFactory for RegexPatternFactory {
    fn construct(
        &self,
        source: &[u8],
    ) -> Result<Bytes, PatternError> {
        let text = std::str::from_utf8(source)
            .map_err(|e| PatternError::new(format!("pattern is not valid UTF-8: {e}")))?;
        Regex::new(text).map_err(|e| PatternError::new(e.to_string()))?;
        Ok(Bytes::copy_from_slice(source))
    }
}

/// Accepts any pattern source as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerbatimPatternFactory;

impl PatternFactory for VerbatimPatternFactory {
    fn construct(
        &self,
        source: &[u8],
    ) -> Result<Bytes, PatternError> {
        Ok(Bytes::copy_from_slice(source))
    }
}

/// Converts opaque host handles to and from plain structure.
pub trait HandleConverter: Send + Sync {
    /// Plain substitute for `handle`, or `None` if the handle is not
    /// convertible.
    fn to_structure(
        &self,
        handle: &dyn Any,
    ) -> Option<Document>;

    /// Inverse of [`to_structure`](Self::to_structure).
    fn from_structure(
        &self,
        doc: &Document,
    ) -> Option<Box<dyn Any + Send + Sync>>;
}

/// Produces source text for a callable handle.
pub trait CodeFormatter: Send + Sync {
    fn to_text(
        &self,
        handle: &dyn Any,
    ) -> Option<String>;
}
