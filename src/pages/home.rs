use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::force_graph::{
	ForceGraphCanvas, ForceGraphState, GraphCommand, HttpGateway, MergeReport, MutationQueue,
	SharedGraphState, drain,
};
use crate::components::search::FilmSearch;
use crate::config::AppConfig;

/// One-line summary of a finished graph update for the status bar.
fn describe(command: GraphCommand, report: &MergeReport) -> String {
	let mut text = match command {
		GraphCommand::Refresh => format!(
			"Loaded {} nodes and {} roles",
			report.added_nodes.len(),
			report.added_edges.len()
		),
		GraphCommand::AddFilm(_) if !report.structure_changed() => {
			"Film is already in the graph".to_string()
		}
		GraphCommand::AddFilm(_) => format!(
			"Added {} nodes and {} roles",
			report.added_nodes.len(),
			report.added_edges.len()
		),
	};
	if !report.issues.is_empty() {
		text.push_str(&format!(" ({} warnings, see console)", report.issues.len()));
	}
	text
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = AppConfig::from_env();
	let gateway = HttpGateway::new(&config.api_base_url);
	let state: SharedGraphState = Rc::new(RefCell::new(ForceGraphState::new(800.0, 600.0)));
	let status = RwSignal::new(String::from("Loading graph..."));

	// Every structural change goes through this queue, one at a time.
	let (queue, rx) = MutationQueue::channel();
	let worker_state = state.clone();
	spawn_local(drain(rx, gateway.clone(), move |command, result| match result {
		Ok(update) => {
			let report = worker_state.borrow_mut().apply(update);
			status.set(describe(command, &report));
		}
		Err(err) => status.set(format!("Could not update graph: {err}")),
	}));
	queue.refresh();

	let closing = queue.clone();
	on_cleanup(move || closing.close());
	let refresh = queue.clone();

	// The canvas and the search form hold local-only handles, so they stay
	// outside the error boundary; only the status line goes through it.
	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas state=state fullscreen=true />
			<div class="graph-overlay">
				<h1>"Film Graph"</h1>
				<p class="subtitle">
					"Click a node to highlight its neighbours. Drag to move, scroll to zoom."
				</p>
				<FilmSearch gateway=gateway queue=queue status=status />
				<ErrorBoundary fallback=|errors| {
					view! {
						<h1>"Uh oh! Something went wrong!"</h1>

						<p>"Errors: "</p>
						<ul>
							{move || {
								errors
									.get()
									.into_iter()
									.map(|(_, e)| view! { <li>{e.to_string()}</li> })
									.collect_view()
							}}
						</ul>
					}
				}>

					<button on:click=move |_| {
						refresh.refresh();
					}>"Refresh"</button>
					<p class="status">{move || status.get()}</p>
				</ErrorBoundary>
			</div>
		</div>
	}
}
