//! Single-writer queue for structural graph updates.
//!
//! Refresh and add-film requests can be fired at any time from the UI. They
//! all go through one channel and are resolved and applied one at a time, so
//! a slow refresh can never land on top of a newer merge.

use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use log::{debug, error, warn};

use super::api::GraphSource;
use super::error::FetchError;
use super::types::GraphData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphCommand {
	/// Reload the whole graph and relayout from scratch.
	Refresh,
	/// Expand the backend graph around a film and merge its subgraph.
	AddFilm(u64),
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphUpdate {
	Replace(GraphData),
	Merge(GraphData),
}

#[derive(Clone, Debug)]
pub struct MutationQueue {
	tx: UnboundedSender<GraphCommand>,
}

impl MutationQueue {
	pub fn channel() -> (Self, UnboundedReceiver<GraphCommand>) {
		let (tx, rx) = mpsc::unbounded();
		(Self { tx }, rx)
	}

	/// Returns false once the queue has been closed.
	pub fn push(&self, command: GraphCommand) -> bool {
		match self.tx.unbounded_send(command) {
			Ok(()) => true,
			Err(err) => {
				warn!("Dropped {:?}: mutation queue is closed", err.into_inner());
				false
			}
		}
	}

	pub fn refresh(&self) -> bool {
		self.push(GraphCommand::Refresh)
	}

	pub fn add_film(&self, film_id: u64) -> bool {
		self.push(GraphCommand::AddFilm(film_id))
	}

	/// Commands already queued are still drained.
	pub fn close(&self) {
		self.tx.close_channel();
	}
}

pub async fn resolve(
	source: &impl GraphSource,
	command: GraphCommand,
) -> Result<GraphUpdate, FetchError> {
	match command {
		GraphCommand::Refresh => {
			let data = GraphData::from(source.fetch_graph().await?);
			Ok(GraphUpdate::Replace(data))
		}
		GraphCommand::AddFilm(film_id) => {
			source.add_film(film_id).await?;
			let data = GraphData::from(source.fetch_graph().await?);
			Ok(GraphUpdate::Merge(data.around_film(film_id)))
		}
	}
}

/// Runs until every sender is gone. `apply` sees each command's outcome in
/// the order the commands were queued.
pub async fn drain(
	mut rx: UnboundedReceiver<GraphCommand>,
	source: impl GraphSource,
	mut apply: impl FnMut(GraphCommand, Result<GraphUpdate, FetchError>),
) {
	while let Some(command) = rx.next().await {
		let result = resolve(&source, command).await;
		if let Err(err) = &result {
			error!("{command:?} failed: {err}");
		}
		apply(command, result);
	}
	debug!("Mutation queue closed");
}
