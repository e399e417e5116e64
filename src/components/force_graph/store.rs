use std::collections::{HashMap, HashSet};

use super::merge::{MergeReport, merge_into};
use super::types::{EdgeId, GraphData, GraphEdge, GraphNode, NodeId};

/// Authoritative set of nodes and edges currently in the view.
///
/// Only grows through [`GraphStore::merge`]; [`GraphStore::replace_all`] is the
/// full rebuild path.
#[derive(Debug, Default)]
pub struct GraphStore {
	pub(super) nodes: HashMap<NodeId, GraphNode>,
	pub(super) edges: HashMap<EdgeId, GraphEdge>,
	revision: u64,
}

/// Read-only view handed to the layout and drawing side.
#[derive(Clone, Copy, Debug)]
pub struct GraphSnapshot<'a> {
	store: &'a GraphStore,
}

impl<'a> GraphSnapshot<'a> {
	pub fn nodes(&self) -> impl Iterator<Item = &'a GraphNode> + use<'a> {
		self.store.nodes.values()
	}

	pub fn edges(&self) -> impl Iterator<Item = &'a GraphEdge> + use<'a> {
		self.store.edges.values()
	}

	pub fn node(&self, id: NodeId) -> Option<&'a GraphNode> {
		self.store.nodes.get(&id)
	}

	pub fn revision(&self) -> u64 {
		self.store.revision
	}
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn snapshot(&self) -> GraphSnapshot<'_> {
		GraphSnapshot { store: self }
	}

	/// Drop everything and load `data` as the new graph.
	pub fn replace_all(&mut self, data: GraphData) -> MergeReport {
		self.nodes.clear();
		self.edges.clear();
		let report = merge_into(self, data);
		self.revision += 1;
		report
	}

	/// Add whatever in `data` is not already present. Existing nodes and edges
	/// are never touched.
	pub fn merge(&mut self, data: GraphData) -> MergeReport {
		let report = merge_into(self, data);
		if report.structure_changed() {
			self.revision += 1;
		}
		report
	}

	/// Bumped once per structural change.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
		self.nodes.get(&id)
	}

	pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
		self.edges.get(id)
	}

	pub fn contains_node(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.nodes.keys().copied()
	}

	pub fn edge_ids(&self) -> impl Iterator<Item = &EdgeId> + '_ {
		self.edges.keys()
	}

	pub fn incident_edges(&self, id: NodeId) -> impl Iterator<Item = &GraphEdge> + '_ {
		self.edges.values().filter(move |edge| edge.touches(id))
	}

	/// Nodes one edge away from `id`, ignoring edge direction.
	pub fn neighbors(&self, id: NodeId) -> HashSet<NodeId> {
		self.incident_edges(id)
			.filter_map(|edge| edge.opposite(id))
			.collect()
	}
}
