pub mod options;
pub mod settings;

pub use options::{DumperConfig, LoaderConfig, DEFAULT_MAX_DEPTH};
pub use settings::Settings;
