use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{debug, info};

use super::layout::{self, IDEAL_EDGE_LENGTH, LayoutPass};
use super::merge::MergeReport;
use super::queue::GraphUpdate;
use super::selection::{DIM_OPACITY, FULL_OPACITY, OpacityTarget, SelectionEngine};
use super::store::GraphStore;
use super::types::{EdgeId, GraphNode, NodeId, NodeKind};

pub const ACTOR_COLOR: &str = "#1f77b4";
pub const FILM_COLOR: &str = "#ff7f0e";

/// Extra world-space slack around a node's radius for hit testing.
pub const HIT_PADDING: f64 = 4.0;
/// Pointer travel, in screen pixels, below which a press-release is a tap.
pub const TAP_SLOP: f64 = 4.0;
/// Fraction of the remaining opacity gap closed per second.
const FADE_SPEED: f64 = 6.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: NodeId,
	pub kind: NodeKind,
	pub label: String,
	pub font_size: f64,
	pub radius: f64,
	pub color: &'static str,
	/// Target opacity set by the selection.
	pub opacity: f64,
	/// Opacity currently drawn; eases toward `opacity`.
	pub shown_opacity: f64,
	/// Dragged by the user; stays anchored after layout passes.
	pub pinned: bool,
}

impl NodeInfo {
	fn from_node(node: &GraphNode) -> Self {
		let kind = node.kind();
		let hint = layout::size_hint(node);
		Self {
			id: node.id(),
			kind,
			label: node.display_label(),
			font_size: hint.font_size,
			radius: hint.radius,
			color: match kind {
				NodeKind::Actor => ACTOR_COLOR,
				NodeKind::Film => FILM_COLOR,
			},
			opacity: FULL_OPACITY,
			shown_opacity: FULL_OPACITY,
			pinned: false,
		}
	}
}

#[derive(Clone, Debug)]
pub struct PlacedEdge {
	pub id: EdgeId,
	/// Character name.
	pub label: String,
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub opacity: f64,
	pub shown_opacity: f64,
}

/// The physics side of the view: a `force_graph` simulation mirroring the
/// store, plus per-element opacity.
pub struct GraphLayout {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<PlacedEdge>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	/// Nodes frozen for the current incremental pass.
	held: HashSet<DefaultNodeIdx>,
	pass: Option<LayoutPass>,
	pass_remaining: f32,
}

impl Default for GraphLayout {
	fn default() -> Self {
		Self {
			graph: ForceGraph::new(layout::simulation_parameters()),
			edges: Vec::new(),
			index: HashMap::new(),
			held: HashSet::new(),
			pass: None,
			pass_remaining: 0.0,
		}
	}
}

impl GraphLayout {
	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	pub fn is_running(&self) -> bool {
		self.pass_remaining > 0.0
	}

	/// The pass currently running, if any.
	pub fn pass(&self) -> Option<LayoutPass> {
		self.pass
	}

	pub fn index_of(&self, id: NodeId) -> Option<DefaultNodeIdx> {
		self.index.get(&id).copied()
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<NodeId> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id);
			}
		});
		found
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f32, f32)> {
		let mut positions = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x(), node.y()));
		});
		positions
	}

	pub fn position(&self, id: NodeId) -> Option<(f32, f32)> {
		let idx = self.index_of(id)?;
		self.positions().get(&idx).copied()
	}

	pub fn node_opacity(&self, id: NodeId) -> Option<f64> {
		let idx = self.index_of(id)?;
		let mut opacity = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				opacity = Some(node.data.user_data.opacity);
			}
		});
		opacity
	}

	pub fn edge_opacity(&self, id: &str) -> Option<f64> {
		self.edges
			.iter()
			.find(|edge| edge.id == id)
			.map(|edge| edge.opacity)
	}

	/// Throw away every position and lay the whole store out on a ring.
	pub fn rebuild(&mut self, store: &GraphStore) {
		*self = Self::default();

		let mut nodes: Vec<&GraphNode> = store.snapshot().nodes().collect();
		nodes.sort_by_key(|node| node.id());
		let ring = ring_radius(nodes.len());
		for (i, node) in nodes.into_iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / store.node_count() as f64;
			let (x, y) = (
				(ring * angle.cos()) as f32,
				(ring * angle.sin()) as f32,
			);
			self.insert_node(node, x, y, false);
		}

		let mut edges: Vec<EdgeId> = store.edge_ids().cloned().collect();
		edges.sort();
		self.insert_edges(store, &edges);

		self.start(LayoutPass::Full);
		info!(
			"Full layout: {} nodes, {} edges",
			self.index.len(),
			self.edges.len()
		);
	}

	/// Place newly merged nodes next to a neighbour that is already on screen
	/// and hold everything else still while they settle. A full pass that is
	/// still running keeps every node free and simply takes the newcomers in.
	pub fn extend(&mut self, store: &GraphStore, report: &MergeReport) {
		let existing: Vec<DefaultNodeIdx> = match self.pass {
			Some(LayoutPass::Full) => Vec::new(),
			_ => self.index.values().copied().collect(),
		};
		let mut positions: HashMap<NodeId, (f32, f32)> = {
			let by_idx = self.positions();
			self.index
				.iter()
				.filter_map(|(id, idx)| by_idx.get(idx).map(|pos| (*id, *pos)))
				.collect()
		};

		let mut pending: Vec<NodeId> = report
			.added_nodes
			.iter()
			.copied()
			.filter(|id| !self.index.contains_key(id))
			.collect();
		let mut placed = 0usize;
		while !pending.is_empty() {
			let before = pending.len();
			let mut rest = Vec::new();
			for id in pending {
				let anchor = store
					.neighbors(id)
					.into_iter()
					.filter_map(|neighbor| positions.get(&neighbor).copied())
					.next();
				match (anchor, store.node(id)) {
					(Some((ax, ay)), Some(node)) => {
						let angle = placed as f64 * GOLDEN_ANGLE;
						let x = ax + IDEAL_EDGE_LENGTH * angle.cos() as f32;
						let y = ay + IDEAL_EDGE_LENGTH * angle.sin() as f32;
						self.insert_node(node, x, y, false);
						positions.insert(id, (x, y));
						placed += 1;
					}
					(None, Some(_)) => rest.push(id),
					(_, None) => {}
				}
			}
			// Nothing left touches a placed node: seed one on the outer ring.
			if rest.len() == before {
				let id = rest.remove(0);
				if let Some(node) = store.node(id) {
					let angle = placed as f64 * GOLDEN_ANGLE;
					let ring = ring_radius(self.index.len() + 1);
					let (x, y) = ((ring * angle.cos()) as f32, (ring * angle.sin()) as f32);
					self.insert_node(node, x, y, false);
					positions.insert(id, (x, y));
					placed += 1;
				}
			}
			pending = rest;
		}

		self.insert_edges(store, &report.added_edges);

		self.held.extend(existing);
		let held = &self.held;
		self.graph.visit_nodes_mut(|node| {
			if held.contains(&node.index()) {
				node.data.is_anchor = true;
			}
		});
		self.start(LayoutPass::Incremental);
		debug!(
			"Incremental layout: placed {placed} nodes, holding {}",
			self.held.len()
		);
	}

	/// Edges between nodes that are already placed.
	pub fn insert_edges(&mut self, store: &GraphStore, ids: &[EdgeId]) {
		for id in ids {
			let Some(edge) = store.edge(id) else {
				continue;
			};
			if let (Some(source), Some(target)) =
				(self.index_of(edge.source), self.index_of(edge.target))
			{
				self.graph.add_edge(source, target, EdgeData::default());
				self.edges.push(PlacedEdge {
					id: edge.id.clone(),
					label: edge.label.clone(),
					source,
					target,
					opacity: FULL_OPACITY,
					shown_opacity: FULL_OPACITY,
				});
			}
		}
	}

	fn insert_node(&mut self, node: &GraphNode, x: f32, y: f32, is_anchor: bool) {
		let idx = self.graph.add_node(NodeData {
			x,
			y,
			mass: layout::repulsion(node.kind()),
			is_anchor,
			user_data: NodeInfo::from_node(node),
		});
		self.index.insert(node.id(), idx);
	}

	/// An incremental pass never downgrades a running full pass.
	fn start(&mut self, pass: LayoutPass) {
		self.pass_remaining = self.pass_remaining.max(pass.duration());
		if self.pass != Some(LayoutPass::Full) {
			self.pass = Some(pass);
		}
	}

	/// Release nodes held for an incremental pass, except the pinned ones.
	fn release(&mut self) {
		let held = std::mem::take(&mut self.held);
		self.graph.visit_nodes_mut(|node| {
			if held.contains(&node.index()) {
				node.data.is_anchor = node.data.user_data.pinned;
			}
		});
	}

	/// Put a node's anchor back the way the layout left it, after a drag
	/// that ended up as a tap.
	pub fn settle(&mut self, idx: DefaultNodeIdx) {
		let held = self.held.contains(&idx);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = node.data.user_data.pinned || held;
			}
		});
	}

	/// Advance physics (while a pass is running or `force` is set) and fades.
	pub fn tick(&mut self, dt: f32, force: bool) {
		if self.is_running() || force {
			self.graph.update(dt);
			self.graph.visit_nodes_mut(|node| {
				if node.data.is_anchor {
					return;
				}
				let (dx, dy) = layout::gravity_offset(node.data.x, node.data.y, dt);
				node.data.x += dx;
				node.data.y += dy;
			});
		}
		if self.is_running() {
			self.pass_remaining -= dt;
			if !self.is_running() {
				self.pass = None;
				self.release();
			}
		}

		let step = (FADE_SPEED * dt as f64).min(1.0);
		self.graph.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			info.shown_opacity += (info.opacity - info.shown_opacity) * step;
		});
		for edge in &mut self.edges {
			edge.shown_opacity += (edge.opacity - edge.shown_opacity) * step;
		}
	}
}

impl OpacityTarget for GraphLayout {
	fn apply_opacity_partition(&mut self, nodes: &HashSet<NodeId>, edges: &HashSet<EdgeId>) {
		self.graph.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			info.opacity = if nodes.contains(&info.id) {
				FULL_OPACITY
			} else {
				DIM_OPACITY
			};
		});
		for edge in &mut self.edges {
			edge.opacity = if edges.contains(&edge.id) {
				FULL_OPACITY
			} else {
				DIM_OPACITY
			};
		}
	}

	fn reset_opacity(&mut self) {
		self.graph.visit_nodes_mut(|node| {
			node.data.user_data.opacity = FULL_OPACITY;
		});
		for edge in &mut self.edges {
			edge.opacity = FULL_OPACITY;
		}
	}
}

fn ring_radius(count: usize) -> f64 {
	100.0_f64.max(IDEAL_EDGE_LENGTH as f64 * (count as f64).sqrt())
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Set once the pointer leaves the tap slop.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Where the current press started, for telling taps from drags.
#[derive(Clone, Debug, Default)]
pub struct PressState {
	pub origin: Option<(f64, f64)>,
	pub node: Option<NodeId>,
}

/// Everything the canvas needs: the store, the selection over it, and the
/// simulation that places it. Created at mount, dropped at unmount.
pub struct ForceGraphState {
	pub store: GraphStore,
	pub selection: SelectionEngine,
	pub layout: GraphLayout,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub press: PressState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl ForceGraphState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			store: GraphStore::new(),
			selection: SelectionEngine::new(),
			layout: GraphLayout::default(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			press: PressState::default(),
			width,
			height,
			flow_time: 0.0,
		}
	}

	/// Apply one structural update from the mutation queue.
	pub fn apply(&mut self, update: GraphUpdate) -> MergeReport {
		let (report, pass) = match update {
			GraphUpdate::Replace(data) => (self.store.replace_all(data), Some(LayoutPass::Full)),
			GraphUpdate::Merge(data) => {
				let report = self.store.merge(data);
				let pass = report.layout_pass();
				(report, pass)
			}
		};

		match pass {
			Some(LayoutPass::Full) => self.layout.rebuild(&self.store),
			Some(LayoutPass::Incremental) => self.layout.extend(&self.store, &report),
			None => self.layout.insert_edges(&self.store, &report.added_edges),
		}

		if pass.is_some() || report.structure_changed() {
			self.selection.refresh(&self.store, &mut self.layout);
		}
		report
	}

	/// `None` is a tap on the background.
	pub fn tap(&mut self, node: Option<NodeId>) {
		match node {
			Some(id) => {
				self.selection.tap_node(&self.store, id, &mut self.layout);
			}
			None => self.selection.tap_background(&mut self.layout),
		}
	}

	pub fn begin_press(&mut self, sx: f64, sy: f64) {
		self.press.origin = Some((sx, sy));
		self.press.node = self
			.node_at_position(sx, sy)
			.and_then(|idx| self.layout.node_id(idx));
	}

	/// Returns true when the press turned out to be a tap.
	pub fn end_press(&mut self, sx: f64, sy: f64) -> bool {
		let press = std::mem::take(&mut self.press);
		let Some((ox, oy)) = press.origin else {
			return false;
		};
		let (dx, dy) = (sx - ox, sy - oy);
		if (dx * dx + dy * dy).sqrt() > TAP_SLOP {
			return false;
		}
		self.tap(press.node);
		true
	}

	/// Press on a node starts a drag, anywhere else starts a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.begin_press(sx, sy);
		match self.node_at_position(sx, sy) {
			Some(idx) => {
				let mut start = (0.0, 0.0);
				self.layout.graph.visit_nodes(|node| {
					if node.index() == idx {
						start = (node.x(), node.y());
					}
				});
				self.drag = DragState {
					active: true,
					node_idx: Some(idx),
					start_x: sx,
					start_y: sy,
					node_start_x: start.0,
					node_start_y: start.1,
					moved: false,
				};
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let (true, Some(idx)) = (self.drag.active, self.drag.node_idx) {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if !self.drag.moved && (dx * dx + dy * dy).sqrt() <= TAP_SLOP {
				return;
			}
			self.drag.moved = true;
			let (nx, ny) = (
				self.drag.node_start_x + (dx / self.transform.k) as f32,
				self.drag.node_start_y + (dy / self.transform.k) as f32,
			);
			self.layout.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// A node that was actually dragged stays pinned where it was dropped. One
	/// dragged out and back inside the tap slop counts as a tap and is let go.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) {
		let tapped = self.end_press(sx, sy);
		match (self.drag.moved, self.drag.node_idx) {
			(true, Some(idx)) if tapped => self.layout.settle(idx),
			(true, Some(idx)) => {
				self.layout.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.is_anchor = true;
						node.data.user_data.pinned = true;
					}
				});
			}
			_ => {}
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	pub fn pointer_leave(&mut self) {
		if self.drag.moved {
			if let Some(idx) = self.drag.node_idx {
				self.layout.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.user_data.pinned = true;
					}
				});
			}
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.press = PressState::default();
	}

	/// Zoom around the pointer so the point under it stays fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.layout.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// Radius is in world space, so it scales with zoom like nodes.
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius + HIT_PADDING {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn has_selection(&self) -> bool {
		self.selection.selected().is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.layout.tick(dt, self.drag.moved);
		self.flow_time += dt as f64;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::super::selection::Selection;
	use super::super::types::fixtures::*;
	use super::super::types::{GraphData, GraphEdge};
	use super::*;

	fn loaded() -> ForceGraphState {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.apply(GraphUpdate::Replace(heat()));
		state
	}

	#[test]
	fn full_fetch_then_select_film_highlights_its_cast() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		assert_eq!(state.store.node_count(), 0);

		state.apply(GraphUpdate::Replace(heat()));
		assert_eq!(state.store.node_count(), 3);
		assert_eq!(state.store.edge_count(), 2);
		assert_eq!(state.layout.node_count(), 3);
		assert_eq!(state.layout.edges.len(), 2);

		state.tap(Some(NodeId::film(100)));

		for id in [NodeId::film(100), NodeId::actor(1), NodeId::actor(2)] {
			assert_eq!(state.layout.node_opacity(id), Some(FULL_OPACITY));
		}
		assert_eq!(state.layout.edge_opacity("r1"), Some(FULL_OPACITY));
		assert_eq!(state.layout.edge_opacity("r2"), Some(FULL_OPACITY));
	}

	#[test]
	fn selecting_an_actor_dims_the_rest() {
		let mut state = loaded();

		state.tap(Some(NodeId::actor(1)));

		assert_eq!(state.layout.node_opacity(NodeId::actor(1)), Some(FULL_OPACITY));
		assert_eq!(state.layout.node_opacity(NodeId::film(100)), Some(FULL_OPACITY));
		assert_eq!(state.layout.node_opacity(NodeId::actor(2)), Some(DIM_OPACITY));
		assert_eq!(state.layout.edge_opacity("r1"), Some(FULL_OPACITY));
		assert_eq!(state.layout.edge_opacity("r2"), Some(DIM_OPACITY));

		state.tap(None);
		assert_eq!(state.selection.state(), Selection::Idle);
		assert_eq!(state.layout.node_opacity(NodeId::actor(2)), Some(FULL_OPACITY));
		assert_eq!(state.layout.edge_opacity("r2"), Some(FULL_OPACITY));
	}

	#[test]
	fn incremental_merge_keeps_placed_nodes_still() {
		let mut state = loaded();
		finish_pass(&mut state);
		let before: Vec<(f32, f32)> = [NodeId::actor(1), NodeId::actor(2), NodeId::film(100)]
			.into_iter()
			.filter_map(|id| state.layout.position(id))
			.collect();

		let report = state.apply(GraphUpdate::Merge(GraphData {
			nodes: vec![actor(1, "Al Pacino", 4), film(300, "Serpico", Some(1973))],
			edges: vec![role("r4", 1, 300, "Frank Serpico")],
		}));
		assert_eq!(report.layout_pass(), Some(LayoutPass::Incremental));
		assert_eq!(state.layout.node_count(), 4);

		for _ in 0..10 {
			state.tick(0.016);
		}
		let after: Vec<(f32, f32)> = [NodeId::actor(1), NodeId::actor(2), NodeId::film(100)]
			.into_iter()
			.filter_map(|id| state.layout.position(id))
			.collect();
		assert_eq!(before, after);
	}

	fn serpico() -> GraphData {
		GraphData {
			nodes: vec![film(300, "Serpico", Some(1973))],
			edges: vec![role("r4", 1, 300, "Frank Serpico")],
		}
	}

	fn finish_pass(state: &mut ForceGraphState) {
		for _ in 0..((LayoutPass::Full.duration() / 0.5) as usize + 1) {
			state.tick(0.5);
		}
		assert!(!state.layout.is_running());
	}

	fn is_anchored(state: &ForceGraphState, id: NodeId) -> bool {
		let mut anchored = false;
		state.layout.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				anchored = node.data.is_anchor;
			}
		});
		anchored
	}

	#[test]
	fn merge_during_full_pass_lets_the_relayout_finish() {
		let mut state = loaded();
		state.tick(0.016);

		state.apply(GraphUpdate::Merge(serpico()));
		assert_eq!(state.layout.pass(), Some(LayoutPass::Full));
		assert!(!is_anchored(&state, NodeId::actor(2)));
		let before = [NodeId::actor(2), NodeId::film(100)].map(|id| state.layout.position(id));

		for _ in 0..((LayoutPass::Full.duration() / 0.016) as usize + 10) {
			state.tick(0.016);
		}

		assert!(!state.layout.is_running());
		assert_eq!(state.layout.pass(), None);
		let after = [NodeId::actor(2), NodeId::film(100)].map(|id| state.layout.position(id));
		assert_ne!(before, after);
		for id in [NodeId::actor(1), NodeId::actor(2), NodeId::film(100), NodeId::film(300)] {
			assert!(!is_anchored(&state, id), "{id} left anchored");
		}
	}

	#[test]
	fn replace_during_incremental_pass_relayouts_everything() {
		let mut state = loaded();
		finish_pass(&mut state);
		state.apply(GraphUpdate::Merge(serpico()));
		assert_eq!(state.layout.pass(), Some(LayoutPass::Incremental));
		assert!(is_anchored(&state, NodeId::actor(1)));

		let mut data = heat();
		data.nodes.push(actor(3, "Val Kilmer", 1));
		data.edges.push(role("r3", 3, 100, "Chris Shiherlis"));
		state.apply(GraphUpdate::Replace(data));

		assert_eq!(state.layout.pass(), Some(LayoutPass::Full));
		assert_eq!(state.layout.node_count(), 4);
		assert_eq!(state.layout.index_of(NodeId::film(300)), None);
		for id in [NodeId::actor(1), NodeId::actor(2), NodeId::actor(3), NodeId::film(100)] {
			assert!(!is_anchored(&state, id), "{id} held after replace");
		}
	}

	#[test]
	fn new_node_is_placed_near_its_neighbour() {
		let mut state = loaded();
		let (ax, ay) = state.layout.position(NodeId::actor(1)).unwrap();

		state.apply(GraphUpdate::Merge(GraphData {
			nodes: vec![film(300, "Serpico", Some(1973))],
			edges: vec![role("r4", 1, 300, "Frank Serpico")],
		}));

		let (fx, fy) = state.layout.position(NodeId::film(300)).unwrap();
		let dist = ((fx - ax).powi(2) + (fy - ay).powi(2)).sqrt();
		assert!((dist - IDEAL_EDGE_LENGTH).abs() < 0.01);
	}

	#[test]
	fn merge_with_nothing_new_starts_no_pass() {
		let mut state = loaded();
		finish_pass(&mut state);

		state.apply(GraphUpdate::Merge(heat()));

		assert!(!state.layout.is_running());
		assert_eq!(state.layout.node_count(), 3);
	}

	#[test]
	fn merge_while_selected_dims_unrelated_newcomers() {
		let mut state = loaded();
		state.tap(Some(NodeId::actor(2)));

		state.apply(GraphUpdate::Merge(GraphData {
			nodes: vec![actor(3, "Val Kilmer", 1)],
			edges: vec![role("r3", 3, 100, "Chris Shiherlis")],
		}));

		assert_eq!(state.selection.selected(), Some(NodeId::actor(2)));
		assert_eq!(state.layout.node_opacity(NodeId::actor(3)), Some(DIM_OPACITY));
		assert_eq!(state.layout.edge_opacity("r3"), Some(DIM_OPACITY));
	}

	#[test]
	fn replace_without_selected_node_clears_selection() {
		let mut state = loaded();
		state.tap(Some(NodeId::actor(2)));

		state.apply(GraphUpdate::Replace(GraphData {
			nodes: vec![actor(3, "Val Kilmer", 1), film(200, "Top Gun", None)],
			edges: vec![role("r3", 3, 200, "Iceman")],
		}));

		assert_eq!(state.selection.state(), Selection::Idle);
		assert_eq!(state.layout.node_count(), 2);
		assert_eq!(state.layout.node_opacity(NodeId::actor(3)), Some(FULL_OPACITY));
	}

	#[test]
	fn dangling_edges_never_reach_the_layout() {
		let mut state = ForceGraphState::new(800.0, 600.0);
		state.apply(GraphUpdate::Merge(GraphData {
			nodes: vec![],
			edges: vec![GraphEdge {
				id: "e1".into(),
				source: NodeId::actor(1),
				target: NodeId::film(99),
				label: String::new(),
			}],
		}));
		assert!(state.layout.edges.is_empty());
	}

	fn screen_position(state: &ForceGraphState, id: NodeId) -> (f64, f64) {
		let (x, y) = state.layout.position(id).unwrap();
		(
			x as f64 * state.transform.k + state.transform.x,
			y as f64 * state.transform.k + state.transform.y,
		)
	}

	fn is_pinned(state: &ForceGraphState, id: NodeId) -> bool {
		let mut pinned = false;
		state.layout.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				pinned = node.data.user_data.pinned && node.data.is_anchor;
			}
		});
		pinned
	}

	#[test]
	fn click_on_node_selects_it_and_click_on_background_clears() {
		let mut state = loaded();
		let (sx, sy) = screen_position(&state, NodeId::film(100));

		state.pointer_down(sx, sy);
		state.pointer_up(sx + 1.0, sy);
		assert_eq!(state.selection.selected(), Some(NodeId::film(100)));
		assert!(!is_pinned(&state, NodeId::film(100)));

		state.pointer_down(1.0, 1.0);
		state.pointer_up(1.0, 2.0);
		assert_eq!(state.selection.state(), Selection::Idle);
	}

	#[test]
	fn dragging_a_node_pins_it_without_selecting() {
		let mut state = loaded();
		let (sx, sy) = screen_position(&state, NodeId::actor(1));

		state.pointer_down(sx, sy);
		state.pointer_move(sx + 40.0, sy + 30.0);
		state.pointer_up(sx + 40.0, sy + 30.0);

		assert_eq!(state.selection.state(), Selection::Idle);
		assert!(is_pinned(&state, NodeId::actor(1)));
		let (nx, ny) = screen_position(&state, NodeId::actor(1));
		assert!((nx - (sx + 40.0)).abs() < 0.01);
		assert!((ny - (sy + 30.0)).abs() < 0.01);
	}

	#[test]
	fn drag_back_inside_the_slop_is_a_tap_and_leaves_the_node_free() {
		let mut state = loaded();
		finish_pass(&mut state);
		let (sx, sy) = screen_position(&state, NodeId::actor(2));

		state.pointer_down(sx, sy);
		state.pointer_move(sx + 30.0, sy);
		assert!(is_anchored(&state, NodeId::actor(2)));
		state.pointer_move(sx + 1.0, sy);
		state.pointer_up(sx + 1.0, sy);

		assert_eq!(state.selection.selected(), Some(NodeId::actor(2)));
		assert!(!is_pinned(&state, NodeId::actor(2)));
		assert!(!is_anchored(&state, NodeId::actor(2)));
	}

	#[test]
	fn pressing_a_node_without_moving_leaves_an_idle_graph_still() {
		let mut state = loaded();
		finish_pass(&mut state);
		let before = state.layout.positions();
		let (sx, sy) = screen_position(&state, NodeId::film(100));

		state.pointer_down(sx, sy);
		for _ in 0..20 {
			state.tick(0.016);
		}

		assert_eq!(state.layout.positions(), before);
	}

	#[test]
	fn panning_moves_the_view_not_the_nodes() {
		let mut state = loaded();
		let before = state.layout.position(NodeId::film(100));

		state.pointer_down(5.0, 5.0);
		state.pointer_move(25.0, 15.0);
		state.pointer_up(25.0, 15.0);

		assert_eq!(state.transform.x, 400.0 + 20.0);
		assert_eq!(state.transform.y, 300.0 + 10.0);
		assert_eq!(state.layout.position(NodeId::film(100)), before);
		assert_eq!(state.selection.state(), Selection::Idle);
	}

	#[test]
	fn zoom_keeps_the_point_under_the_pointer() {
		let mut state = loaded();
		let before = state.screen_to_graph(120.0, 80.0);

		state.zoom_at(120.0, 80.0, -1.0);

		let after = state.screen_to_graph(120.0, 80.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
		assert!(state.transform.k > 1.0);
	}

	#[test]
	fn shown_opacity_eases_toward_target() {
		let mut state = loaded();
		state.tap(Some(NodeId::actor(1)));
		state.tick(0.016);

		let mut shown = None;
		state.layout.graph.visit_nodes(|node| {
			if node.data.user_data.id == NodeId::actor(2) {
				shown = Some(node.data.user_data.shown_opacity);
			}
		});
		let shown = shown.unwrap();
		assert!(shown < FULL_OPACITY && shown > DIM_OPACITY);
	}
}
