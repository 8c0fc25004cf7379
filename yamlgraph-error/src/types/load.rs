use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode, TagError};

/// Ошибка загрузки потока событий в граф значений.
///
/// Любая ошибка фатальна для всего вызова `load_stream`: частичные документы
/// не возвращаются.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Событие пришло не в том порядке (терминатор вместо узла и наоборот,
    /// нарушенная рамка потока/документа).
    #[error("Structural error in document {document}: {reason}")]
    Structural { document: usize, reason: String },
    /// Тег вне закрытого словаря.
    #[error(transparent)]
    UnknownTag(#[from] TagError),
    /// Алиас ссылается на якорь, не объявленный ранее в этом документе.
    #[error("Alias '*{anchor}' in document {document} has no matching anchor")]
    DanglingAlias { document: usize, anchor: String },
    /// Превышен лимит глубины вложенности.
    #[error("Nesting depth limit exceeded: {current} > {max}")]
    DepthLimit { current: usize, max: usize },
    /// Коллаборатор отказался строить шаблон из `regexp`-скаляра.
    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
}

impl LoadError {
    pub fn structural(
        document: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::Structural {
            document,
            reason: reason.into(),
        }
    }
}

impl ErrorExt for LoadError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Structural { .. } => StatusCode::StructureViolation,
            Self::UnknownTag(inner) => inner.status_code(),
            Self::DanglingAlias { .. } => StatusCode::DanglingAlias,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
            Self::Pattern { .. } => StatusCode::InvalidPattern,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::Structural { .. } => "Malformed event stream".to_string(),
            Self::UnknownTag(inner) => inner.client_message(),
            Self::DanglingAlias { .. } => "Alias without anchor".to_string(),
            Self::DepthLimit { .. } => "Data structure too deeply nested".to_string(),
            Self::Pattern { .. } => "Invalid pattern".to_string(),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "load".to_string()),
            ("status_code", self.status_code().to_string()),
        ];

        match self {
            Self::Structural { document, .. } | Self::DanglingAlias { document, .. } => {
                tags.push(("document", document.to_string()));
            }
            Self::UnknownTag(inner) => {
                tags.push(("tag", inner.tag().to_string()));
            }
            _ => {}
        }

        tags
    }
}
