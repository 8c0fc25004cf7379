use thiserror::Error;

use super::Value;
use crate::tag::TagKind;

/// Typed wrapper: marks a payload as a richer host type (blessed record,
/// compiled pattern, callable, symbolic handle).
///
/// Fields are private so the kind/payload pairing is checked once, in
/// [`Typed::new`]:
///
/// - `hash`, `array`, `ref` wrap an arena node and always carry a class
///   (the bare tags load back as the plain node, so an unclassed wrapper
///   has no stream form);
/// - `scalar` wraps an arena node (reference cell) or a string and always
///   carries a class;
/// - `code` wraps a callable handle or its source text;
/// - `regexp` wraps the pattern source.
///
/// Whether a `hash` payload really is a mapping (and so on) can only be
/// checked against the owning graph; the dumper does that.
#[derive(Debug, Clone, PartialEq)]
pub struct Typed {
    kind: TagKind,
    class: Option<String>,
    payload: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypedError {
    #[error("kind '{kind}' cannot wrap a {payload} payload")]
    PayloadMismatch {
        kind: TagKind,
        payload: &'static str,
    },
    #[error("kind '{kind}' does not accept class {class:?}")]
    InvalidClass {
        kind: TagKind,
        class: Option<String>,
    },
}

impl Typed {
    pub fn new(
        kind: TagKind,
        class: Option<String>,
        payload: Value,
    ) -> Result<Self, TypedError> {
        let class_ok = match kind {
            TagKind::Str => false,
            TagKind::Hash | TagKind::Array | TagKind::Ref => {
                class.is_some() && kind.accepts_class(class.as_deref())
            }
            _ => kind.accepts_class(class.as_deref()),
        };
        if !class_ok {
            return Err(TypedError::InvalidClass { kind, class });
        }

        let fits = match (kind, &payload) {
            (TagKind::Hash | TagKind::Array | TagKind::Ref, Value::Node(_)) => true,
            (TagKind::Scalar, Value::Node(_) | Value::Str(_)) => true,
            (TagKind::Code, Value::Handle(_) | Value::Str(_)) => true,
            (TagKind::Regexp, Value::Str(_)) => true,
            _ => false,
        };
        if !fits {
            return Err(TypedError::PayloadMismatch {
                kind,
                payload: payload.kind_name(),
            });
        }

        Ok(Self {
            kind,
            class,
            payload,
        })
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}
