//! Client for the graph backend.

use log::debug;
use serde::de::DeserializeOwned;

use super::error::FetchError;
use super::types::{Film, GraphResponse};

/// Where graph data comes from. The queue worker and the search panel only
/// see this trait.
#[allow(async_fn_in_trait)]
pub trait GraphSource {
	/// Films matching `title`, most popular first.
	async fn search_films(&self, title: &str) -> Result<Vec<Film>, FetchError>;
	/// Ask the backend to pull a film and its cast into the stored graph.
	async fn add_film(&self, film_id: u64) -> Result<(), FetchError>;
	async fn fetch_graph(&self) -> Result<GraphResponse, FetchError>;
}

#[derive(Clone, Debug)]
pub struct HttpGateway {
	base_url: String,
	client: reqwest::Client,
}

impl HttpGateway {
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			client: reqwest::Client::new(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn send(
		&self,
		url: &str,
		request: reqwest::RequestBuilder,
	) -> Result<reqwest::Response, FetchError> {
		let response = request.send().await.map_err(|source| FetchError::Transport {
			url: url.to_string(),
			source,
		})?;

		if !response.status().is_success() {
			return Err(FetchError::Status {
				url: url.to_string(),
				status: response.status().as_u16(),
			});
		}
		Ok(response)
	}

	async fn get_json<T: DeserializeOwned>(
		&self,
		url: &str,
		request: reqwest::RequestBuilder,
	) -> Result<T, FetchError> {
		self.send(url, request)
			.await?
			.json::<T>()
			.await
			.map_err(|source| FetchError::Decode {
				url: url.to_string(),
				source,
			})
	}
}

impl GraphSource for HttpGateway {
	async fn search_films(&self, title: &str) -> Result<Vec<Film>, FetchError> {
		let url = self.url("/search/film");
		let request = self.client.get(&url).query(&[("title", title)]);
		let films: Vec<Film> = self.get_json(&url, request).await?;
		debug!("Search for {title:?} returned {} films", films.len());
		Ok(films)
	}

	async fn add_film(&self, film_id: u64) -> Result<(), FetchError> {
		let url = self.url(&format!("/graph/add/{film_id}"));
		let request = self.client.post(&url);
		self.send(&url, request).await?;
		Ok(())
	}

	async fn fetch_graph(&self) -> Result<GraphResponse, FetchError> {
		let url = self.url("/graph");
		let request = self.client.get(&url);
		self.get_json(&url, request).await
	}
}
