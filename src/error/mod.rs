pub use yamlgraph_error::{
    DumpError, EmitError, ErrorExt, LoadError, LogLevel, StatusCode, TagError,
};

pub use crate::{collab::PatternError, value::TypedError};

pub type LoadResult<T> = Result<T, LoadError>;
pub type DumpResult<T> = Result<T, DumpError>;
