//! Sharing discovery ahead of emission.
//!
//! Every composite reachable from the root is visited by identity. The
//! first visit marks it seen-once, any later visit (a second parent or a
//! cycle) marks it seen-twice and does not descend again. Only seen-twice
//! nodes get anchors during emission.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::{
    depth_error,
    shadow::{Scope, ShadowTable},
};
use crate::{
    config::DumperConfig,
    error::DumpResult,
    tag::TagKind,
    value::{Node, NodeId, Value},
};

type Slot = (Scope, NodeId);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mark {
    SeenOnce,
    SeenTwice,
    Emitted(String),
}

/// What the emitter should do with a composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Claim {
    /// Not shared: emit without an anchor.
    Plain,
    /// Shared and met for the first time: emit under this anchor.
    Anchor(String),
    /// Already emitted: emit an alias to this anchor.
    Alias(String),
}

/// Per-document identity table.
pub(super) struct AnchorTable {
    marks: FxHashMap<Slot, Mark>,
    prefix: String,
    issued: usize,
}

impl AnchorTable {
    pub(super) fn new(prefix: &str) -> Self {
        Self {
            marks: FxHashMap::default(),
            prefix: prefix.to_owned(),
            issued: 0,
        }
    }

    /// Records a visit. Returns true on the first one.
    fn visit(
        &mut self,
        slot: Slot,
    ) -> bool {
        match self.marks.get_mut(&slot) {
            None => {
                self.marks.insert(slot, Mark::SeenOnce);
                true
            }
            Some(mark) => {
                if *mark == Mark::SeenOnce {
                    *mark = Mark::SeenTwice;
                }
                false
            }
        }
    }

    /// Decides how to emit `slot`. A shared node is marked emitted before
    /// the caller descends into it, so a cycle back to it becomes an alias.
    pub(super) fn claim(
        &mut self,
        slot: Slot,
    ) -> Claim {
        let Some(mark) = self.marks.get_mut(&slot) else {
            return Claim::Plain;
        };
        match mark {
            Mark::Emitted(name) => Claim::Alias(name.clone()),
            Mark::SeenTwice => {
                self.issued += 1;
                let name = format!("{}{}", self.prefix, self.issued);
                *mark = Mark::Emitted(name.clone());
                Claim::Anchor(name)
            }
            Mark::SeenOnce => Claim::Plain,
        }
    }

    /// Number of nodes that will carry an anchor.
    pub(super) fn shared(&self) -> usize {
        self.marks
            .values()
            .filter(|m| !matches!(m, Mark::SeenOnce))
            .count()
    }
}

/// Walks everything reachable from `root`, converting bare handles through
/// the shadow table on the way.
pub(super) fn prewalk(
    root: &Value,
    shadows: &mut ShadowTable<'_>,
    anchors: &mut AnchorTable,
    config: &DumperConfig,
) -> DumpResult<()> {
    let mut stack: Vec<(Scope, Value, usize)> = vec![(Scope::ROOT, root.clone(), 0)];

    while let Some((scope, value, depth)) = stack.pop() {
        match value {
            Value::Node(id) => {
                if !anchors.visit((scope, id)) {
                    continue;
                }
                // A dangling id is reported by the emitter.
                let Some(node) = shadows.graph(scope).get(id) else {
                    continue;
                };
                let depth = depth + 1;
                if depth > config.max_depth {
                    return Err(depth_error(depth, config.max_depth));
                }
                match node {
                    Node::Sequence(items) => {
                        stack.extend(items.iter().map(|v| (scope, v.clone(), depth)));
                    }
                    Node::Mapping(map) => {
                        stack.extend(map.values().map(|v| (scope, v.clone(), depth)));
                    }
                    Node::Reference(inner) => stack.push((scope, inner.clone(), depth)),
                }
            }
            // Callable handles are rendered as text and never converted.
            Value::Typed(typed) if typed.kind() != TagKind::Code => {
                stack.push((scope, typed.into_payload(), depth));
            }
            Value::Handle(handle) => {
                let depth = depth + 1;
                if depth > config.max_depth {
                    return Err(depth_error(depth, config.max_depth));
                }
                let target = shadows.resolve(scope, handle, config.handle_converter.as_deref())?;
                if let Some(substitute) = shadows.root_of(target) {
                    stack.push((target, substitute.clone(), depth));
                }
            }
            _ => {}
        }
    }

    trace!(
        shared = anchors.shared(),
        substitutes = shadows.len(),
        "Prewalk finished"
    );
    Ok(())
}
