use std::collections::HashSet;

use log::debug;

use super::store::GraphStore;
use super::types::{EdgeId, NodeId};

pub const FULL_OPACITY: f64 = 1.0;
pub const DIM_OPACITY: f64 = 0.2;

/// The drawing side of a highlight. Anything not in the highlighted sets is
/// dimmed.
pub trait OpacityTarget {
	fn apply_opacity_partition(&mut self, nodes: &HashSet<NodeId>, edges: &HashSet<EdgeId>);
	fn reset_opacity(&mut self);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	Idle,
	NodeSelected(NodeId),
}

/// A node, its direct neighbours, and the edges between them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighlightPartition {
	pub nodes: HashSet<NodeId>,
	pub edges: HashSet<EdgeId>,
}

impl HighlightPartition {
	pub fn around(store: &GraphStore, id: NodeId) -> Self {
		let mut nodes = store.neighbors(id);
		nodes.insert(id);
		let edges = store
			.incident_edges(id)
			.map(|edge| edge.id.clone())
			.collect();
		Self { nodes, edges }
	}
}

/// Tracks the selected node and pushes the matching opacity partition.
/// Never mutates the store.
#[derive(Debug, Default)]
pub struct SelectionEngine {
	state: Selection,
}

impl SelectionEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> Selection {
		self.state
	}

	pub fn selected(&self) -> Option<NodeId> {
		match self.state {
			Selection::Idle => None,
			Selection::NodeSelected(id) => Some(id),
		}
	}

	/// Tapping the selected node again re-applies the same partition.
	pub fn tap_node(
		&mut self,
		store: &GraphStore,
		id: NodeId,
		target: &mut impl OpacityTarget,
	) -> Option<HighlightPartition> {
		if !store.contains_node(id) {
			debug!("Tap on unknown node {id}, treating as background");
			self.tap_background(target);
			return None;
		}

		debug!("Selected {id}");
		self.state = Selection::NodeSelected(id);
		let partition = HighlightPartition::around(store, id);
		target.reset_opacity();
		target.apply_opacity_partition(&partition.nodes, &partition.edges);
		Some(partition)
	}

	pub fn tap_background(&mut self, target: &mut impl OpacityTarget) {
		if self.state != Selection::Idle {
			debug!("Selection cleared");
		}
		self.state = Selection::Idle;
		target.reset_opacity();
	}

	/// Recompute after the store changed underneath the selection.
	pub fn refresh(&mut self, store: &GraphStore, target: &mut impl OpacityTarget) {
		match self.state {
			Selection::Idle => target.reset_opacity(),
			Selection::NodeSelected(id) => {
				self.tap_node(store, id, target);
			}
		}
	}
}
