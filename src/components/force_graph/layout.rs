//! Per-kind physics and sizing parameters consumed by the layout engine and
//! the renderer. Everything here is a pure function of the node data.

use force_graph::SimulationParameters;

use super::types::{GraphNode, NodeKind};

/// Repulsion carried by actor nodes. Casts cluster tightly around their
/// films, so actors push harder than films do.
pub const ACTOR_REPULSION: f32 = 14.0;
pub const FILM_REPULSION: f32 = 8.0;

/// Rest length used when placing a new node next to an existing neighbour.
pub const IDEAL_EDGE_LENGTH: f32 = 60.0;
pub const ELASTICITY: f32 = 0.05;
/// Pull toward the origin applied to nodes beyond [`GRAVITY_RANGE`].
pub const GRAVITY: f32 = 0.8;
pub const GRAVITY_RANGE: f32 = 400.0;

pub const FORCE_CHARGE: f32 = 150.0;
pub const FORCE_MAX: f32 = 100.0;
pub const NODE_SPEED: f32 = 3000.0;
pub const DAMPING_FACTOR: f32 = 0.9;

/// Seconds of simulation granted to each kind of pass.
pub const FULL_PASS_SECONDS: f32 = 6.0;
pub const INCREMENTAL_PASS_SECONDS: f32 = 2.5;

/// Font size of an actor with no features.
pub const ACTOR_FONT_OFFSET: f64 = 8.0;
pub const ACTOR_FONT_SCALE: f64 = 3.0;
pub const FILM_FONT_SIZE: f64 = 12.0;

pub const ACTOR_RADIUS: f64 = 5.0;
pub const FILM_RADIUS: f64 = 7.0;

/// How much of the graph a layout run is allowed to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPass {
	/// Rebuild every position from scratch.
	Full,
	/// Place only the new nodes; everything already on screen stays put.
	Incremental,
}

impl LayoutPass {
	pub fn duration(self) -> f32 {
		match self {
			LayoutPass::Full => FULL_PASS_SECONDS,
			LayoutPass::Incremental => INCREMENTAL_PASS_SECONDS,
		}
	}
}

/// Rendering attributes derived from a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeHint {
	pub font_size: f64,
	pub radius: f64,
}

pub fn repulsion(kind: NodeKind) -> f32 {
	match kind {
		NodeKind::Actor => ACTOR_REPULSION,
		NodeKind::Film => FILM_REPULSION,
	}
}

/// Grows with the log of the feature count.
pub fn actor_font_size(features: u32) -> f64 {
	ACTOR_FONT_OFFSET + ACTOR_FONT_SCALE * f64::from(features).ln_1p()
}

pub fn font_size(node: &GraphNode) -> f64 {
	match node {
		GraphNode::Actor(actor) => actor_font_size(actor.features),
		GraphNode::Film(_) => FILM_FONT_SIZE,
	}
}

pub fn radius(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Actor => ACTOR_RADIUS,
		NodeKind::Film => FILM_RADIUS,
	}
}

pub fn size_hint(node: &GraphNode) -> SizeHint {
	SizeHint {
		font_size: font_size(node),
		radius: radius(node.kind()),
	}
}

pub fn simulation_parameters() -> SimulationParameters {
	SimulationParameters {
		force_charge: FORCE_CHARGE,
		force_spring: ELASTICITY,
		force_max: FORCE_MAX,
		node_speed: NODE_SPEED,
		damping_factor: DAMPING_FACTOR,
	}
}

/// Velocity-free correction applied after each physics step: a point farther
/// than [`GRAVITY_RANGE`] from the origin is moved back toward it.
pub fn gravity_offset(x: f32, y: f32, dt: f32) -> (f32, f32) {
	let dist = (x * x + y * y).sqrt();
	if dist <= GRAVITY_RANGE {
		return (0.0, 0.0);
	}
	let pull = ((dist - GRAVITY_RANGE) * GRAVITY * dt).min(dist - GRAVITY_RANGE);
	(-x / dist * pull, -y / dist * pull)
}
