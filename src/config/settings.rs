use serde::{Deserialize, Serialize};

use config::{Config, ConfigError, Environment};

use super::{DumperConfig, LoaderConfig, DEFAULT_MAX_DEPTH};

/// Process-level switches, read from `YAMLGRAPH_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub max_depth: usize,
    pub load_blessed: bool,
    pub dump_code: bool,
    pub sort_keys: bool,
    pub anchor_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            load_blessed: true,
            dump_code: false,
            sort_keys: false,
            anchor_prefix: String::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .set_default("max_depth", DEFAULT_MAX_DEPTH as i64)?
            .set_default("load_blessed", true)?
            .set_default("dump_code", false)?
            .set_default("sort_keys", false)?
            .set_default("anchor_prefix", "")?
            // YAMLGRAPH_MAX_DEPTH, YAMLGRAPH_DUMP_CODE, ...
            .add_source(Environment::with_prefix("YAMLGRAPH"))
            .build()?;

        cfg.try_deserialize()
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            max_depth: self.max_depth,
            load_blessed: self.load_blessed,
            ..LoaderConfig::default()
        }
    }

    /// Dumper options. Collaborators are left unset; attach them with the
    /// `with_*` builders.
    pub fn dumper_config(&self) -> DumperConfig {
        DumperConfig {
            max_depth: self.max_depth,
            dump_code: self.dump_code,
            sort_keys: self.sort_keys,
            anchor_prefix: self.anchor_prefix.clone(),
            ..DumperConfig::default()
        }
    }
}
