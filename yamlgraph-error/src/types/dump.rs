use std::{any::Any, io};

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибка приёмника событий: нижележащий эмиттер отказал в записи.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Приёмник отверг событие.
    #[error("Event sink rejected event: {reason}")]
    Rejected { reason: String },
    /// Ошибка I/O в приёмнике, сохраняем оригинальный `io::Error` как
    /// источник.
    #[error("I/O error while emitting: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl EmitError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Ошибка выгрузки графа значений в поток событий.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error(transparent)]
    Emit(#[from] EmitError),
    /// Значение нарушает инварианты модели: узел вне арены, полезная
    /// нагрузка `Typed` не соответствует виду, дескриптор без конвертера.
    #[error("Malformed value: {reason}")]
    MalformedValue { reason: String },
    /// Превышен лимит глубины вложенности.
    #[error("Nesting depth limit exceeded: {current} > {max}")]
    DepthLimit { current: usize, max: usize },
}

impl DumpError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            reason: reason.into(),
        }
    }
}

impl ErrorExt for EmitError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected { .. } => StatusCode::EmitRejected,
            Self::Io { .. } => StatusCode::Io,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for DumpError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Emit(inner) => inner.status_code(),
            Self::MalformedValue { .. } => StatusCode::InvalidValue,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::Emit(_) => "Event sink failure".to_string(),
            Self::MalformedValue { .. } => "Malformed value graph".to_string(),
            Self::DepthLimit { .. } => "Data structure too deeply nested".to_string(),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "dump".to_string()),
            ("status_code", self.status_code().to_string()),
        ];

        if let Self::Emit(inner) = self {
            let kind = match inner {
                EmitError::Rejected { .. } => "rejected",
                EmitError::Io { .. } => "io",
            };
            tags.push(("emit_kind", kind.to_string()));
        }

        tags
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    /// Тест проверяет From<io::Error> для EmitError и что source() возвращает
    /// оригинальную ошибку.
    #[test]
    fn test_from_io_error_and_source() {
        let io_err = io::Error::new(io::ErrorKind::Other, "pipe closed");
        let err = EmitError::from(io_err);
        assert!(err.to_string().contains("pipe closed"));
        let src = err.source().expect("expected source");
        assert_eq!(src.to_string(), "pipe closed");
        assert_eq!(err.status_code(), StatusCode::Io);
    }

    /// Тест проверяет конвертацию EmitError -> DumpError и метки метрик.
    #[test]
    fn test_emit_error_conversion_and_metrics() {
        let dump: DumpError = EmitError::rejected("full").into();
        assert_eq!(dump.to_string(), "Event sink rejected event: full");
        assert_eq!(dump.status_code(), StatusCode::EmitRejected);
        let tags = dump.metrics_tags();
        assert!(tags.iter().any(|(k, v)| *k == "emit_kind" && v == "rejected"));
    }

    #[test]
    fn test_malformed_value_display() {
        let err = DumpError::malformed("node #7 is not in the graph");
        assert_eq!(err.to_string(), "Malformed value: node #7 is not in the graph");
        assert_eq!(err.status_code(), StatusCode::InvalidValue);
        assert_eq!(err.client_message(), "Malformed value graph");
    }
}
