//! Film search form and result list.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;

use crate::components::force_graph::{Film, GraphSource, HttpGateway, MutationQueue};

#[component]
pub fn FilmSearch(
	gateway: HttpGateway,
	queue: MutationQueue,
	status: RwSignal<String>,
) -> impl IntoView {
	let (query, set_query) = signal(String::new());
	let (results, set_results) = signal(Vec::<Film>::new());

	let on_search = move |_: leptos::ev::MouseEvent| {
		let title = query.get_untracked().trim().to_string();
		if title.is_empty() {
			return;
		}
		let gateway = gateway.clone();
		status.set(format!("Searching for \"{title}\"..."));
		spawn_local(async move {
			match gateway.search_films(&title).await {
				Ok(films) => {
					status.set(format!("{} films match \"{title}\"", films.len()));
					set_results.set(films);
				}
				Err(err) => {
					error!("Search failed: {err}");
					status.set(format!("Search failed: {err}"));
				}
			}
		});
	};

	view! {
		<div class="film-search">
			<input
				type="text"
				placeholder="Film title"
				prop:value=move || query.get()
				on:input=move |ev| set_query.set(event_target_value(&ev))
			/>
			<button on:click=on_search>"Search"</button>
			<ul class="film-results">
				{move || {
					results
						.get()
						.into_iter()
						.map(|film| {
							let (id, title) = (film.id, film.display_title());
							let queue = queue.clone();
							let label = title.clone();
							view! {
								<li>
									<span>{title}</span>
									<button on:click=move |_| {
										if queue.add_film(id) {
											status.set(format!("Adding {label}..."));
										}
									}>"Add"</button>
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</div>
	}
}
