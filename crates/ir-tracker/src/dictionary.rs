use std::collections::btree_map::{self, BTreeMap};

use crate::tool::{ToolId, TrackedTool};

/// Tools keyed by identity, iterated in ascending id order.
#[derive(Clone, Debug, Default)]
pub struct ToolDictionary {
    tools: BTreeMap<ToolId, TrackedTool>,
}

impl ToolDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tool unless its id is already taken; returns whether it was
    /// inserted (first seen wins).
    pub fn insert(&mut self, tool: TrackedTool) -> bool {
        match self.tools.entry(tool.id) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(tool);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, id: ToolId) -> Option<&TrackedTool> {
        self.tools.get(&id)
    }

    pub fn get_mut(&mut self, id: ToolId) -> Option<&mut TrackedTool> {
        self.tools.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedTool> {
        self.tools.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedTool> {
        self.tools.values_mut()
    }

    /// Keep only the tools for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut TrackedTool) -> bool) {
        self.tools.retain(|_, tool| keep(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.tools.values().filter(|t| t.visible).count()
    }

    /// Append one 18-element record per tool (see [`TrackedTool::serialize_into`]).
    pub fn serialize_into(&self, out: &mut Vec<f64>) {
        out.reserve(self.tools.len() * 18);
        for tool in self.tools.values() {
            tool.serialize_into(out);
        }
    }
}

impl FromIterator<TrackedTool> for ToolDictionary {
    fn from_iter<I: IntoIterator<Item = TrackedTool>>(iter: I) -> Self {
        let mut dict = Self::new();
        for tool in iter {
            dict.insert(tool);
        }
        dict
    }
}
