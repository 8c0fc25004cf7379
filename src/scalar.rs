//! Plain-scalar ambiguity rules shared by both directions.
//!
//! On load, an untagged plain scalar spelled `~` or empty is `Null`, and
//! `true`/`false` are booleans. Every other scalar is a string. On dump, a
//! string whose text would be read back as something else must be quoted;
//! `null` is quoted as well for the benefit of other readers.

use bytes::Bytes;

use crate::value::Value;

const NULL_SPELLINGS: [&[u8]; 2] = [b"", b"~"];

/// Value of an untagged plain scalar.
pub fn resolve_plain(text: Bytes) -> Value {
    match &text[..] {
        b"true" => Value::Bool(true),
        b"false" => Value::Bool(false),
        t if NULL_SPELLINGS.contains(&t) => Value::Null,
        _ => Value::Str(text),
    }
}

/// Whether `text`, emitted as a string, must be quoted.
pub fn needs_quotes(text: &[u8]) -> bool {
    NULL_SPELLINGS.contains(&text) || matches!(text, b"true" | b"false" | b"null")
}
