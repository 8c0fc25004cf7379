use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных (граф значений)
/// - 6xxx: Приёмник событий / IO
/// - 8xxx: Ошибки потока событий и тегов
///
/// # Реализация:
/// - `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`.
/// - опционально: `strum` для `AsRefStr`/`EnumIter` (feature = "strum").
/// - опционально: `serde_repr` для сериализации в виде числового значения
///   (feature = "serde_repr").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Unknown = 1000,
    Unsupported = 1001,
    Internal = 1003,
    InvalidArgs = 1004,

    // === 2xxx: Ошибки данных ===
    InvalidValue = 2004,
    InvalidData = 2009,
    InvalidPattern = 2010,

    // === 6xxx: Приёмник событий ===
    Io = 6000,
    EmitRejected = 6008,

    // === 8xxx: Поток событий ===
    StructureViolation = 8000,
    UnknownTag = 8001,
    DanglingAlias = 8002,
    DepthLimit = 8008,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Вернёт `true`, если переданный `code` означает успешный результат.
    pub fn is_success(code: u32) -> bool {
        Self::Success as u32 == code
    }

    /// Ошибка во входных данных: сломанный поток событий, неизвестный тег,
    /// висячий алиас (диапазоны 2xxx и 8xxx).
    pub fn is_input_error(&self) -> bool {
        let c = self.code();
        (2000..=2999).contains(&c) || (8000..=8999).contains(&c)
    }

    /// Ошибка окружения: приёмник событий отказал в записи.
    pub fn is_sink_error(&self) -> bool {
        (6000..=6999).contains(&self.code())
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::StructureViolation
            | Self::UnknownTag
            | Self::DanglingAlias
            | Self::InvalidPattern
            | Self::InvalidData => LogLevel::Info,
            Self::DepthLimit | Self::EmitRejected | Self::Io => LogLevel::Warn,
            Self::Internal | Self::InvalidValue => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}
