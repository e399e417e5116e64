mod api;
mod component;
mod error;
mod layout;
mod merge;
mod queue;
mod render;
mod selection;
mod state;
mod store;
mod types;

pub use api::{GraphSource, HttpGateway};
pub use component::{ForceGraphCanvas, SharedGraphState};
pub use error::{FetchError, MergeIssue};
pub use layout::{LayoutPass, SizeHint};
pub use merge::MergeReport;
pub use queue::{GraphCommand, GraphUpdate, MutationQueue, drain};
pub use selection::{HighlightPartition, OpacityTarget, Selection, SelectionEngine};
pub use state::ForceGraphState;
pub use store::{GraphSnapshot, GraphStore};
pub use types::{
	Actor, EdgeId, Film, GraphData, GraphEdge, GraphNode, GraphResponse, NodeId, NodeKind, Role,
};
