use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which table a node was loaded from.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	#[default]
	Actor,
	Film,
}

impl NodeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Actor => "actor",
			NodeKind::Film => "film",
		}
	}

	pub fn other(self) -> Self {
		match self {
			NodeKind::Actor => NodeKind::Film,
			NodeKind::Film => NodeKind::Actor,
		}
	}
}

/// Graph key for a node. Actor and film ids come from separate tables, so the
/// kind is part of the key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
	pub kind: NodeKind,
	pub raw: u64,
}

impl NodeId {
	pub fn actor(raw: u64) -> Self {
		Self {
			kind: NodeKind::Actor,
			raw,
		}
	}

	pub fn film(raw: u64) -> Self {
		Self {
			kind: NodeKind::Film,
			raw,
		}
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind.as_str(), self.raw)
	}
}

pub type EdgeId = String;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
	pub id: u64,
	pub name: String,
	pub popularity: f32,
	/// Number of films in the graph this actor appears in.
	pub features: u32,
}

/// A film as returned by both `/graph` and `/search/film`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Film {
	pub id: u64,
	pub title: String,
	pub year: Option<i32>,
	pub popularity: f64,
}

impl Film {
	pub fn display_title(&self) -> String {
		match self.year {
			Some(year) => format!("{} ({})", self.title, year),
			None => self.title.clone(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
	pub id: String,
	pub actor_id: u64,
	pub film_id: u64,
	pub character: String,
}

/// Body of `GET /graph`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
	#[serde(default)]
	pub actors: Vec<Actor>,
	#[serde(default)]
	pub films: Vec<Film>,
	#[serde(default)]
	pub roles: Vec<Role>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphNode {
	Actor(Actor),
	Film(Film),
}

impl GraphNode {
	pub fn id(&self) -> NodeId {
		match self {
			GraphNode::Actor(actor) => NodeId::actor(actor.id),
			GraphNode::Film(film) => NodeId::film(film.id),
		}
	}

	pub fn kind(&self) -> NodeKind {
		match self {
			GraphNode::Actor(_) => NodeKind::Actor,
			GraphNode::Film(_) => NodeKind::Film,
		}
	}

	pub fn display_label(&self) -> String {
		match self {
			GraphNode::Actor(actor) => actor.name.clone(),
			GraphNode::Film(film) => film.display_title(),
		}
	}
}

/// A role edge, always actor -> film.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: EdgeId,
	pub source: NodeId,
	pub target: NodeId,
	/// Character name.
	pub label: String,
}

impl GraphEdge {
	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}

	/// The endpoint on the other side of `id`, if `id` is an endpoint.
	pub fn opposite(&self, id: NodeId) -> Option<NodeId> {
		if self.source == id {
			Some(self.target)
		} else if self.target == id {
			Some(self.source)
		} else {
			None
		}
	}
}

impl From<Role> for GraphEdge {
	fn from(role: Role) -> Self {
		Self {
			id: role.id,
			source: NodeId::actor(role.actor_id),
			target: NodeId::film(role.film_id),
			label: role.character,
		}
	}
}

/// A batch of nodes and edges to load into the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// The film, its roles, and the actors credited in them.
	pub fn around_film(&self, film_id: u64) -> GraphData {
		let film = NodeId::film(film_id);
		let edges: Vec<GraphEdge> = self
			.edges
			.iter()
			.filter(|edge| edge.target == film)
			.cloned()
			.collect();
		let keep: HashSet<NodeId> = edges
			.iter()
			.map(|edge| edge.source)
			.chain(std::iter::once(film))
			.collect();
		let nodes = self
			.nodes
			.iter()
			.filter(|node| keep.contains(&node.id()))
			.cloned()
			.collect();

		GraphData { nodes, edges }
	}
}

impl From<GraphResponse> for GraphData {
	fn from(response: GraphResponse) -> Self {
		let nodes = response
			.actors
			.into_iter()
			.map(GraphNode::Actor)
			.chain(response.films.into_iter().map(GraphNode::Film))
			.collect();
		let edges = response.roles.into_iter().map(GraphEdge::from).collect();

		GraphData { nodes, edges }
	}
}
