//! Build-time configuration for the client.

/// Backend used when `FILM_GRAPH_API_URL` is not set at build time.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	pub api_base_url: String,
}

impl AppConfig {
	/// The client runs in the browser, so the only knob is baked in when the
	/// WASM bundle is built.
	pub fn from_env() -> Self {
		Self::with_base_url(option_env!("FILM_GRAPH_API_URL"))
	}

	fn with_base_url(base_url: Option<&str>) -> Self {
		let api_base_url = base_url
			.map(str::trim)
			.filter(|url| !url.is_empty())
			.unwrap_or(DEFAULT_API_BASE_URL)
			.to_string();
		Self { api_base_url }
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self::with_base_url(None)
	}
}
