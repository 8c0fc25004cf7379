use std::{fmt, sync::Arc};

use crate::collab::{CodeFormatter, HandleConverter, PatternFactory, RegexPatternFactory};

/// Default nesting limit for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Loader options.
#[derive(Clone)]
pub struct LoaderConfig {
    /// Deepest container nesting accepted before `DepthLimit`.
    pub max_depth: usize,
    /// When false, typed wrappers are dropped and the bare structure is
    /// returned. `regexp` payloads are still validated.
    pub load_blessed: bool,
    pub pattern_factory: Arc<dyn PatternFactory>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            load_blessed: true,
            pattern_factory: Arc::new(RegexPatternFactory),
        }
    }
}

impl LoaderConfig {
    pub fn with_max_depth(
        mut self,
        max_depth: usize,
    ) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_load_blessed(
        mut self,
        load_blessed: bool,
    ) -> Self {
        self.load_blessed = load_blessed;
        self
    }

    pub fn with_pattern_factory(
        mut self,
        factory: Arc<dyn PatternFactory>,
    ) -> Self {
        self.pattern_factory = factory;
        self
    }
}

impl fmt::Debug for LoaderConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("LoaderConfig")
            .field("max_depth", &self.max_depth)
            .field("load_blessed", &self.load_blessed)
            .finish_non_exhaustive()
    }
}

/// Dumper options.
#[derive(Clone)]
pub struct DumperConfig {
    pub max_depth: usize,
    /// Emit callable source text from the [`CodeFormatter`] instead of the
    /// placeholder.
    pub dump_code: bool,
    /// Emit mapping keys in byte order instead of insertion order.
    pub sort_keys: bool,
    /// Prefix of generated anchor names (`<prefix>1`, `<prefix>2`, ...).
    pub anchor_prefix: String,
    pub handle_converter: Option<Arc<dyn HandleConverter>>,
    pub code_formatter: Option<Arc<dyn CodeFormatter>>,
}

impl Default for DumperConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            dump_code: false,
            sort_keys: false,
            anchor_prefix: String::new(),
            handle_converter: None,
            code_formatter: None,
        }
    }
}

impl DumperConfig {
    pub fn with_max_depth(
        mut self,
        max_depth: usize,
    ) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_dump_code(
        mut self,
        dump_code: bool,
    ) -> Self {
        self.dump_code = dump_code;
        self
    }

    pub fn with_sort_keys(
        mut self,
        sort_keys: bool,
    ) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn with_anchor_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> Self {
        self.anchor_prefix = prefix.into();
        self
    }

    pub fn with_handle_converter(
        mut self,
        converter: Arc<dyn HandleConverter>,
    ) -> Self {
        self.handle_converter = Some(converter);
        self
    }

    pub fn with_code_formatter(
        mut self,
        formatter: Arc<dyn CodeFormatter>,
    ) -> Self {
        self.code_formatter = Some(formatter);
        self
    }
}

impl fmt::Debug for DumperConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DumperConfig")
            .field("max_depth", &self.max_depth)
            .field("dump_code", &self.dump_code)
            .field("sort_keys", &self.sort_keys)
            .field("anchor_prefix", &self.anchor_prefix)
            .field("handle_converter", &self.handle_converter.is_some())
            .field("code_formatter", &self.code_formatter.is_some())
            .finish()
    }
}
