//! Tag codec.
//!
//! Translates between the closed tag vocabulary and structured type
//! information. A tag has the form `<ns><kind>[:<class>]` where `<ns>` is
//! [`TAG_NAMESPACE`]. The class part may itself contain colons
//! (`hash:Foo::Bar`), so only the first colon after the kind separates it.
//!
//! | kind     | class     | payload                         |
//! |----------|-----------|---------------------------------|
//! | `hash`   | optional  | mapping                         |
//! | `array`  | optional  | sequence                        |
//! | `scalar` | required  | reference cell or string        |
//! | `ref`    | optional  | reference cell                  |
//! | `code`   | optional  | callable handle or its text     |
//! | `regexp` | optional  | pattern source                  |
//! | `str`    | forbidden | plain string (untagged marker)  |

use std::fmt;

use crate::{error::TagError, value::Typed};

/// Fixed namespace prefix of every tag in the vocabulary.
pub const TAG_NAMESPACE: &str = "tag:yaml.org,2002:";

/// Structural kind encoded in a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Hash,
    Array,
    Scalar,
    Ref,
    Code,
    Regexp,
    Str,
}

/// Whether a kind accepts a `:<class>` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassRule {
    Optional,
    Required,
    Forbidden,
}

impl TagKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::Hash => "hash",
            TagKind::Array => "array",
            TagKind::Scalar => "scalar",
            TagKind::Ref => "ref",
            TagKind::Code => "code",
            TagKind::Regexp => "regexp",
            TagKind::Str => "str",
        }
    }

    fn from_name(name: &str) -> Option<TagKind> {
        match name {
            "hash" => Some(TagKind::Hash),
            "array" => Some(TagKind::Array),
            "scalar" => Some(TagKind::Scalar),
            "ref" => Some(TagKind::Ref),
            "code" => Some(TagKind::Code),
            "regexp" => Some(TagKind::Regexp),
            "str" => Some(TagKind::Str),
            _ => None,
        }
    }

    fn class_rule(self) -> ClassRule {
        match self {
            TagKind::Scalar => ClassRule::Required,
            TagKind::Str => ClassRule::Forbidden,
            _ => ClassRule::Optional,
        }
    }

    /// Whether `class` (present or absent) is acceptable for this kind.
    pub fn accepts_class(
        self,
        class: Option<&str>,
    ) -> bool {
        match (self.class_rule(), class) {
            (ClassRule::Forbidden, Some(_)) | (ClassRule::Required, None) => false,
            (_, Some(c)) => is_valid_class(c),
            (_, None) => true,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed form of a tag string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    pub class: Option<String>,
}

impl Tag {
    pub fn new(
        kind: TagKind,
        class: Option<String>,
    ) -> Self {
        Self { kind, class }
    }

    /// Renders the tag back to its wire form.
    pub fn render(&self) -> String {
        render(self.kind, self.class.as_deref())
    }
}

fn is_valid_class(class: &str) -> bool {
    !class.is_empty() && !class.chars().any(|c| c.is_whitespace() || c.is_control())
}

fn render(
    kind: TagKind,
    class: Option<&str>,
) -> String {
    match class {
        Some(class) => format!("{TAG_NAMESPACE}{kind}:{class}"),
        None => format!("{TAG_NAMESPACE}{kind}"),
    }
}

/// Tag string for a typed wrapper.
pub fn tag_for(typed: &Typed) -> String {
    render(typed.kind(), typed.class())
}

/// Tag string for a bare kind with no class (e.g. `ref` for an untyped
/// reference cell).
pub fn bare_tag(kind: TagKind) -> String {
    render(kind, None)
}

/// Parses a tag string into its kind and optional class.
pub fn parse_tag(tag: &str) -> Result<Tag, TagError> {
    let rest = tag
        .strip_prefix(TAG_NAMESPACE)
        .ok_or_else(|| TagError::unknown(tag))?;

    let (name, class) = match rest.split_once(':') {
        Some((name, class)) => (name, Some(class)),
        None => (rest, None),
    };

    let kind = TagKind::from_name(name).ok_or_else(|| TagError::unknown(tag))?;
    if !kind.accepts_class(class) {
        return Err(TagError::unknown(tag));
    }

    Ok(Tag::new(kind, class.map(str::to_owned)))
}
