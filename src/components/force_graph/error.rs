use thiserror::Error;

use super::types::{EdgeId, NodeId};

/// A request to the graph backend failed. Never retried automatically.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("request to {url} failed: {source}")]
	Transport {
		url: String,
		#[source]
		source: reqwest::Error,
	},
	#[error("{url} returned HTTP {status}")]
	Status { url: String, status: u16 },
	#[error("could not decode response from {url}: {source}")]
	Decode {
		url: String,
		#[source]
		source: reqwest::Error,
	},
}

/// Recoverable problems found while merging a batch into the store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MergeIssue {
	/// The edge was dropped.
	#[error("role {edge} dropped: endpoint {missing} is not in the graph")]
	DanglingEdgeReference { edge: EdgeId, missing: NodeId },
	/// Both nodes are kept; their raw ids collide across the two tables.
	#[error("{incoming} shares raw id {} with existing {existing}", .incoming.raw)]
	DuplicateIdConflict { incoming: NodeId, existing: NodeId },
}
