//! Backend location.

/// Backend used when `DIAGRAM_API_URL` is not set at build time.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Where the REST backend lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	/// Base URL without a trailing slash.
	pub base_url: String,
}

impl ApiConfig {
	/// Config for `base_url`; trailing slashes are dropped.
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_owned(),
		}
	}

	/// Reads `DIAGRAM_API_URL` as baked in at compile time.
	pub fn from_env() -> Self {
		Self::new(
			option_env!("DIAGRAM_API_URL")
				.filter(|url| !url.trim().is_empty())
				.unwrap_or(DEFAULT_API_URL),
		)
	}

	/// Absolute URL of an API path such as `/auth/me`.
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self::new(DEFAULT_API_URL)
	}
}
