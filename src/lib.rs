/// Host collaborators: pattern factory, handle converter, code formatter.
pub mod collab;
/// Loader/dumper options and environment-driven settings.
pub mod config;
/// Graph to event stream, with anchors for shared and cyclic nodes.
pub mod dumper;
/// Error types and status codes.
pub mod error;
/// Event vocabulary and sinks.
pub mod event;
/// Event stream to graph, resolving anchors, aliases and tags.
pub mod loader;
/// Flexible logging (formatting, filters, file output).
pub mod logging;
/// Plain-scalar ambiguity rules.
pub mod scalar;
/// Tag codec for the closed tag vocabulary.
pub mod tag;
/// Value model: values, the node arena, typed wrappers.
pub mod value;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

pub use collab::{
    CodeFormatter, HandleConverter, PatternError, PatternFactory, RegexPatternFactory,
    VerbatimPatternFactory,
};
pub use config::{DumperConfig, LoaderConfig, Settings};
pub use dumper::{dump_stream, Dumper, CODE_PLACEHOLDER};
pub use error::{DumpError, EmitError, ErrorExt, LoadError, StatusCode, TagError};
pub use event::{Event, EventSink, ScalarStyle};
pub use loader::{load_stream, Loader};
pub use tag::{parse_tag, tag_for, Tag, TagKind, TAG_NAMESPACE};
pub use value::{Document, Graph, HandleId, Mapping, Node, NodeId, Typed, Value};
