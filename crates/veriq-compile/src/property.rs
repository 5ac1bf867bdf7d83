//! `PropertySet`: shared state between passes.
//!
//! Standard properties cover the target device and layouts. Passes publish
//! their reports as custom properties keyed by type:
//!
//! ```
//! use veriq_compile::PropertySet;
//! use veriq_route::CouplingMap;
//!
//! #[derive(Debug, PartialEq)]
//! struct Note(&'static str);
//!
//! let mut props = PropertySet::new().with_coupling_map(CouplingMap::linear(3));
//! props.insert(Note("seen"));
//! assert_eq!(props.get::<Note>(), Some(&Note("seen")));
//! assert!(props.coupling_map.is_some());
//! ```

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;
use veriq_route::{CouplingMap, RegisterLayout};

use crate::device::DeviceGraph;

/// Properties shared by the passes of one pipeline.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Target coupling map. Mapping passes run only when it is set.
    pub coupling_map: Option<CouplingMap>,

    /// An established placement, consumed by the engine's `simple_map`.
    pub layout: Option<RegisterLayout>,

    /// Final layout reported by the engine after `simple_map`,
    /// `list[physical] = logical`.
    pub final_layout: Option<Vec<u32>>,

    /// Engine graph for `coupling_map`, kept across runs.
    pub(crate) device_graph: Option<DeviceGraph>,

    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_coupling_map(mut self, coupling_map: CouplingMap) -> Self {
        self.coupling_map = Some(coupling_map);
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: RegisterLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Insert a custom property, replacing any value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.custom.contains_key(&TypeId::of::<T>())
    }

    /// The cached device graph, if one was built.
    pub fn device_graph(&self) -> Option<&DeviceGraph> {
        self.device_graph.as_ref()
    }

    /// Engine objects owned by this property set rather than by a run.
    pub fn retained_handles(&self) -> usize {
        self.device_graph.as_ref().map_or(0, DeviceGraph::live_handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_custom_properties() {
        let mut props = PropertySet::new();
        assert!(!props.contains::<Counter>());
        props.insert(Counter(2));
        props.get_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(props.get::<Counter>(), Some(&Counter(3)));
        assert_eq!(props.remove::<Counter>(), Some(Counter(3)));
        assert!(props.get::<Counter>().is_none());
    }

    #[test]
    fn test_no_retained_handles_by_default() {
        let props = PropertySet::new().with_coupling_map(CouplingMap::linear(2));
        assert_eq!(props.retained_handles(), 0);
        assert!(props.device_graph().is_none());
    }
}
