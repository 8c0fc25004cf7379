//! Event vocabulary shared with the grammar-level parser and emitter.
//!
//! Events serialize with `serde`; scalar values are written as JSON strings
//! when they are valid UTF-8 and as byte arrays otherwise, so fixtures stay
//! readable while binary payloads survive.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::EmitError;

/// Presentation style of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarStyle {
    #[default]
    Plain,
    Quoted,
}

/// One event of the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    StreamStart,
    DocumentStart,
    MappingStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
    SequenceStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
    Scalar {
        #[serde(with = "scalar_bytes")]
        value: Bytes,
        #[serde(default)]
        style: ScalarStyle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
    Alias {
        anchor: String,
    },
    MappingEnd,
    SequenceEnd,
    DocumentEnd,
    StreamEnd,
}

impl Event {
    pub fn plain(value: impl Into<Bytes>) -> Self {
        Event::Scalar {
            value: value.into(),
            style: ScalarStyle::Plain,
            tag: None,
        }
    }

    pub fn quoted(value: impl Into<Bytes>) -> Self {
        Event::Scalar {
            value: value.into(),
            style: ScalarStyle::Quoted,
            tag: None,
        }
    }

    pub fn mapping_start() -> Self {
        Event::MappingStart {
            anchor: None,
            tag: None,
        }
    }

    pub fn sequence_start() -> Self {
        Event::SequenceStart {
            anchor: None,
            tag: None,
        }
    }

    pub fn alias(anchor: impl Into<String>) -> Self {
        Event::Alias {
            anchor: anchor.into(),
        }
    }

    /// Name of the event kind, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Event::StreamStart => "StreamStart",
            Event::DocumentStart => "DocumentStart",
            Event::MappingStart { .. } => "MappingStart",
            Event::SequenceStart { .. } => "SequenceStart",
            Event::Scalar { .. } => "Scalar",
            Event::Alias { .. } => "Alias",
            Event::MappingEnd => "MappingEnd",
            Event::SequenceEnd => "SequenceEnd",
            Event::DocumentEnd => "DocumentEnd",
            Event::StreamEnd => "StreamEnd",
        }
    }

    /// Whether this event terminates the enclosing container or document.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Event::MappingEnd | Event::SequenceEnd | Event::DocumentEnd
        )
    }
}

/// Destination of emitted events.
pub trait EventSink {
    fn emit(
        &mut self,
        event: Event,
    ) -> Result<(), EmitError>;
}

impl EventSink for Vec<Event> {
    fn emit(
        &mut self,
        event: Event,
    ) -> Result<(), EmitError> {
        self.push(event);
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(
        &mut self,
        event: Event,
    ) -> Result<(), EmitError> {
        (**self).emit(event)
    }
}

/// Parses a JSON array of events.
pub fn events_from_json(json: &str) -> Result<Vec<Event>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Renders events as a JSON array.
pub fn events_to_json(events: &[Event]) -> Result<String, serde_json::Error> {
    serde_json::to_string(events)
}

mod scalar_bytes {
    use std::fmt;

    use bytes::Bytes;
    use serde::{
        de::{self, SeqAccess, Visitor},
        Deserializer, Serializer,
    };

    pub fn serialize<S: Serializer>(
        value: &Bytes,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(value) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.serialize_bytes(value),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }

    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = Bytes;

        fn expecting(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            f.write_str("a string or a byte array")
        }

        fn visit_str<E: de::Error>(
            self,
            v: &str,
        ) -> Result<Bytes, E> {
            Ok(Bytes::copy_from_slice(v.as_bytes()))
        }

        fn visit_string<E: de::Error>(
            self,
            v: String,
        ) -> Result<Bytes, E> {
            Ok(Bytes::from(v))
        }

        fn visit_bytes<E: de::Error>(
            self,
            v: &[u8],
        ) -> Result<Bytes, E> {
            Ok(Bytes::copy_from_slice(v))
        }

        fn visit_seq<A: SeqAccess<'de>>(
            self,
            mut seq: A,
        ) -> Result<Bytes, A::Error> {
            let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(byte) = seq.next_element::<u8>()? {
                out.push(byte);
            }
            Ok(Bytes::from(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fixture_parses() {
        let events = events_from_json(
            r#"[
                {"event": "StreamStart"},
                {"event": "DocumentStart"},
                {"event": "MappingStart", "anchor": "1"},
                {"event": "Scalar", "value": "a"},
                {"event": "Scalar", "value": "true", "style": "quoted"},
                {"event": "MappingEnd"},
                {"event": "DocumentEnd"},
                {"event": "StreamEnd"}
            ]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 8);
        assert_eq!(
            events[2],
            Event::MappingStart {
                anchor: Some("1".into()),
                tag: None
            }
        );
        assert_eq!(events[3], Event::plain("a"));
        assert_eq!(events[4], Event::quoted("true"));
    }

    /// Тест проверяет, что не-UTF-8 скаляры переживают JSON как массив байт.
    #[test]
    fn test_binary_scalar_survives_json() {
        let events = vec![Event::plain(vec![0xffu8, 0x00, 0x41])];
        let json = events_to_json(&events).unwrap();
        assert!(json.contains("[255,0,65]"));
        assert_eq!(events_from_json(&json).unwrap(), events);
    }

    #[test]
    fn test_terminators() {
        assert!(Event::MappingEnd.is_terminator());
        assert!(Event::DocumentEnd.is_terminator());
        assert!(!Event::StreamEnd.is_terminator());
        assert!(!Event::plain("x").is_terminator());
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Event> = Vec::new();
        sink.emit(Event::StreamStart).unwrap();
        assert_eq!(sink, vec![Event::StreamStart]);
    }
}
