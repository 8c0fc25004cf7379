pub mod dump;
pub mod load;
pub mod tag;

// Публичный экспорт всех типов ошибок из вложенных модулей.
pub use dump::*;
pub use load::*;
pub use tag::*;
