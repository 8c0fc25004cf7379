use rustc_hash::FxHashMap;
use tracing::trace;

use super::malformed;
use crate::{
    collab::HandleConverter,
    error::DumpResult,
    value::{Document, Graph, HandleId, Value},
};

/// Graph a value belongs to: the document being dumped, or the substitute
/// produced for one of its handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) struct Scope(usize);

impl Scope {
    pub(super) const ROOT: Scope = Scope(0);
}

/// Substitutes for opaque handles, converted once per document.
///
/// A handle is keyed by the scope it was found in, since handle ids are
/// only unique within one graph.
pub(super) struct ShadowTable<'d> {
    root: &'d Graph,
    shadows: Vec<Document>,
    index: FxHashMap<(Scope, HandleId), Scope>,
}

impl<'d> ShadowTable<'d> {
    pub(super) fn new(root: &'d Graph) -> Self {
        Self {
            root,
            shadows: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub(super) fn graph(
        &self,
        scope: Scope,
    ) -> &Graph {
        match scope.0.checked_sub(1) {
            None => self.root,
            Some(i) => &self.shadows[i].graph,
        }
    }

    /// Root value of a substitute scope.
    pub(super) fn root_of(
        &self,
        scope: Scope,
    ) -> Option<&Value> {
        scope
            .0
            .checked_sub(1)
            .and_then(|i| self.shadows.get(i))
            .map(|doc| &doc.root)
    }

    /// Scope of the substitute already produced for `handle`.
    pub(super) fn get(
        &self,
        scope: Scope,
        handle: HandleId,
    ) -> Option<Scope> {
        self.index.get(&(scope, handle)).copied()
    }

    /// Converts `handle` unless it was converted before, returning the scope
    /// of its substitute.
    pub(super) fn resolve(
        &mut self,
        scope: Scope,
        handle: HandleId,
        converter: Option<&dyn HandleConverter>,
    ) -> DumpResult<Scope> {
        if let Some(target) = self.get(scope, handle) {
            return Ok(target);
        }

        let Some(converter) = converter else {
            return Err(malformed(format!("{handle} found but no handle converter is set")));
        };
        let Some(object) = self.graph(scope).handle(handle) else {
            return Err(malformed(format!("{handle} is not in the graph")));
        };
        let Some(substitute) = converter.to_structure(object) else {
            return Err(malformed(format!("{handle} could not be converted")));
        };

        self.shadows.push(substitute);
        let target = Scope(self.shadows.len());
        self.index.insert((scope, handle), target);
        trace!(%handle, scope = target.0, "Handle converted");
        Ok(target)
    }

    pub(super) fn len(&self) -> usize {
        self.shadows.len()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        any::Any,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[derive(Default)]
    struct CountingConverter {
        calls: AtomicUsize,
    }

    impl HandleConverter for CountingConverter {
        fn to_structure(
            &self,
            handle: &dyn Any,
        ) -> Option<Document> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = handle.downcast_ref::<u32>()?;
            Some(Document::scalar(Value::from(n.to_string())))
        }

        fn from_structure(
            &self,
            _doc: &Document,
        ) -> Option<Box<dyn Any + Send + Sync>> {
            None
        }
    }

    /// Тест проверяет, что дескриптор конвертируется один раз на документ.
    #[test]
    fn test_resolve_converts_once() {
        let mut g = Graph::new();
        let Value::Handle(h) = g.add_handle(7u32) else {
            panic!("expected handle");
        };
        let converter = CountingConverter::default();
        let mut table = ShadowTable::new(&g);

        let a = table.resolve(Scope::ROOT, h, Some(&converter)).unwrap();
        let b = table.resolve(Scope::ROOT, h, Some(&converter)).unwrap();
        assert_eq!(a, b);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.root_of(a), Some(&Value::from("7")));
    }

    #[test]
    fn test_resolve_without_converter_is_malformed() {
        let mut g = Graph::new();
        let Value::Handle(h) = g.add_handle(()) else {
            panic!("expected handle");
        };
        let mut table = ShadowTable::new(&g);
        assert!(table.resolve(Scope::ROOT, h, None).is_err());
    }

    #[test]
    fn test_unconvertible_handle_is_malformed() {
        let mut g = Graph::new();
        let Value::Handle(h) = g.add_handle("not a u32") else {
            panic!("expected handle");
        };
        let converter = CountingConverter::default();
        let mut table = ShadowTable::new(&g);
        assert!(table.resolve(Scope::ROOT, h, Some(&converter)).is_err());
    }
}
