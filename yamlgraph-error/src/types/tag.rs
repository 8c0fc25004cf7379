use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибка кодека тегов.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Тег вне закрытого словаря: чужой префикс, неизвестный вид или
    /// недопустимое имя класса.
    #[error("Unknown tag '{tag}'")]
    Unknown { tag: String },
}

impl TagError {
    pub fn unknown(tag: impl Into<String>) -> Self {
        Self::Unknown { tag: tag.into() }
    }

    /// Исходная строка тега.
    pub fn tag(&self) -> &str {
        match self {
            Self::Unknown { tag } => tag,
        }
    }
}

impl ErrorExt for TagError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UnknownTag
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        "Unsupported type tag".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown() {
        let err = TagError::unknown("!foo");
        assert_eq!(err.to_string(), "Unknown tag '!foo'");
        assert_eq!(err.tag(), "!foo");
        assert_eq!(err.status_code(), StatusCode::UnknownTag);
    }
}
