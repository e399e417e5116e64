use log::{info, warn};

use super::error::MergeIssue;
use super::layout::LayoutPass;
use super::store::GraphStore;
use super::types::{EdgeId, GraphData, NodeId};

/// What a merge did to the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeReport {
	pub added_nodes: Vec<NodeId>,
	pub added_edges: Vec<EdgeId>,
	/// Incoming nodes that were already present and left as they were.
	pub kept_nodes: usize,
	pub kept_edges: usize,
	pub issues: Vec<MergeIssue>,
}

impl MergeReport {
	pub fn structure_changed(&self) -> bool {
		!self.added_nodes.is_empty() || !self.added_edges.is_empty()
	}

	/// New edges between nodes that are already placed need no relayout.
	pub fn layout_pass(&self) -> Option<LayoutPass> {
		(!self.added_nodes.is_empty()).then_some(LayoutPass::Incremental)
	}

	pub fn dropped_edges(&self) -> usize {
		self.issues
			.iter()
			.filter(|issue| matches!(issue, MergeIssue::DanglingEdgeReference { .. }))
			.count()
	}
}

/// Nodes go in first so that edges in the same batch can resolve against
/// them. An id that is already present keeps its current node.
pub(super) fn merge_into(store: &mut GraphStore, data: GraphData) -> MergeReport {
	let mut report = MergeReport::default();

	for node in data.nodes {
		let id = node.id();
		if store.nodes.contains_key(&id) {
			report.kept_nodes += 1;
			continue;
		}

		let twin = NodeId {
			kind: id.kind.other(),
			raw: id.raw,
		};
		if store.nodes.contains_key(&twin) {
			let issue = MergeIssue::DuplicateIdConflict {
				incoming: id,
				existing: twin,
			};
			warn!("{issue}");
			report.issues.push(issue);
		}

		store.nodes.insert(id, node);
		report.added_nodes.push(id);
	}

	for edge in data.edges {
		if store.edges.contains_key(&edge.id) {
			report.kept_edges += 1;
			continue;
		}

		let missing = [edge.source, edge.target]
			.into_iter()
			.find(|endpoint| !store.nodes.contains_key(endpoint));
		if let Some(missing) = missing {
			let issue = MergeIssue::DanglingEdgeReference {
				edge: edge.id,
				missing,
			};
			warn!("{issue}");
			report.issues.push(issue);
			continue;
		}

		report.added_edges.push(edge.id.clone());
		store.edges.insert(edge.id.clone(), edge);
	}

	info!(
		"Merged graph: +{} nodes, +{} edges ({} nodes kept, {} edges dropped)",
		report.added_nodes.len(),
		report.added_edges.len(),
		report.kept_nodes,
		report.dropped_edges()
	);

	report
}

#[cfg(test)]
mod tests {
	use super::super::types::fixtures::*;
	use super::super::types::{GraphEdge, GraphNode};
	use super::*;

	fn sorted_ids(store: &GraphStore) -> (Vec<NodeId>, Vec<EdgeId>) {
		let mut nodes: Vec<NodeId> = store.node_ids().collect();
		let mut edges: Vec<EdgeId> = store.edge_ids().cloned().collect();
		nodes.sort();
		edges.sort();
		(nodes, edges)
	}

	#[test]
	fn merging_twice_is_a_no_op() {
		let mut once = GraphStore::new();
		once.merge(heat());

		let mut twice = GraphStore::new();
		twice.merge(heat());
		let second = twice.merge(heat());

		assert_eq!(sorted_ids(&once), sorted_ids(&twice));
		assert!(!second.structure_changed());
		assert_eq!(second.kept_nodes, 3);
		assert_eq!(second.kept_edges, 2);
		assert_eq!(second.layout_pass(), None);
		assert_eq!(twice.revision(), 1);
	}

	#[test]
	fn existing_nodes_keep_their_attributes() {
		let mut store = GraphStore::new();
		store.merge(heat());

		// The backend bumps the feature count once the actor appears in a
		// second film.
		let update = GraphData {
			nodes: vec![actor(1, "Al Pacino", 4), film(300, "Serpico", Some(1973))],
			edges: vec![role("r4", 1, 300, "Frank Serpico")],
		};
		let report = store.merge(update);

		assert_eq!(report.added_nodes, vec![NodeId::film(300)]);
		assert_eq!(report.kept_nodes, 1);
		assert_eq!(store.node_count(), 4);
		assert_eq!(store.edge_count(), 3);
		match store.node(NodeId::actor(1)) {
			Some(GraphNode::Actor(actor)) => assert_eq!(actor.features, 3),
			other => panic!("expected actor, got {other:?}"),
		}
	}

	#[test]
	fn edge_with_missing_endpoint_is_dropped() {
		let mut store = GraphStore::new();
		let data = GraphData {
			nodes: vec![],
			edges: vec![GraphEdge {
				id: "e1".into(),
				source: NodeId::actor(1),
				target: NodeId::film(99),
				label: "Nobody".into(),
			}],
		};

		let report = store.merge(data);

		assert_eq!(store.edge_count(), 0);
		assert_eq!(
			report.issues,
			vec![MergeIssue::DanglingEdgeReference {
				edge: "e1".into(),
				missing: NodeId::actor(1),
			}]
		);
		assert_eq!(report.dropped_edges(), 1);
		assert!(!report.structure_changed());
	}

	#[test]
	fn edges_resolve_against_nodes_already_in_the_store() {
		let mut store = GraphStore::new();
		store.merge(GraphData {
			nodes: vec![actor(1, "Al Pacino", 3)],
			edges: vec![],
		});

		let report = store.merge(GraphData {
			nodes: vec![film(100, "Heat", Some(1995))],
			edges: vec![role("r1", 1, 100, "Vincent Hanna")],
		});

		assert_eq!(report.added_edges, vec!["r1".to_string()]);
		assert!(report.issues.is_empty());
	}

	#[test]
	fn cross_kind_id_collision_is_reported() {
		let mut store = GraphStore::new();
		store.merge(heat());

		let report = store.merge(GraphData {
			nodes: vec![film(1, "The Godfather", Some(1972))],
			edges: vec![],
		});

		assert_eq!(
			report.issues,
			vec![MergeIssue::DuplicateIdConflict {
				incoming: NodeId::film(1),
				existing: NodeId::actor(1),
			}]
		);
		assert!(store.contains_node(NodeId::actor(1)));
		assert!(store.contains_node(NodeId::film(1)));
	}

	#[test]
	fn merge_never_shrinks_the_store() {
		let mut store = GraphStore::new();
		store.merge(heat());
		let before = sorted_ids(&store);

		store.merge(GraphData::default());
		store.merge(GraphData {
			nodes: vec![actor(3, "Val Kilmer", 1)],
			edges: vec![role("r3", 3, 100, "Chris Shiherlis")],
		});

		let (nodes, edges) = sorted_ids(&store);
		assert!(before.0.iter().all(|id| nodes.contains(id)));
		assert!(before.1.iter().all(|id| edges.contains(id)));
		assert_eq!(nodes.len(), 4);
	}

	#[test]
	fn new_nodes_request_an_incremental_pass() {
		let mut store = GraphStore::new();
		let report = store.merge(heat());
		assert_eq!(report.layout_pass(), Some(LayoutPass::Incremental));
	}
}
