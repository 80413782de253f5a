//! Error types for backend calls.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Failure of a backend call, with a message fit for an inline banner.
#[derive(Error, Debug)]
pub enum ApiError {
	/// The request never got a response.
	#[error("Network error: {0}")]
	Network(String),

	/// Non-2xx response other than 401.
	#[error("{message}")]
	Http {
		/// HTTP status code.
		status: u16,
		/// The body's `detail`, or a generic status line.
		message: String,
	},

	/// 401; the session has already been ended.
	#[error("Your session has expired, please log in again")]
	Unauthorized,

	/// The project has no diagram record.
	#[error("No diagram exists for this project yet")]
	NotFound,

	/// The response body was not what the endpoint promises.
	#[error("Invalid response from server: {0}")]
	Decode(String),
}

#[derive(Deserialize)]
struct ErrorBody {
	detail: Option<Value>,
}

impl ApiError {
	/// Builds an [`ApiError::Http`] from a non-2xx response body, preferring
	/// the backend's `detail` string.
	pub fn from_response(status: u16, body: &str) -> Self {
		let message = serde_json::from_str::<ErrorBody>(body)
			.ok()
			.and_then(|b| b.detail)
			.and_then(|detail| detail.as_str().map(str::to_owned))
			.unwrap_or_else(|| format!("HTTP error! status: {status}"));
		ApiError::Http { status, message }
	}
}

impl From<reqwest::Error> for ApiError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_decode() {
			ApiError::Decode(err.to_string())
		} else {
			ApiError::Network(err.to_string())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detail_string_becomes_the_message() {
		let err = ApiError::from_response(404, r#"{"detail":"UML not found"}"#);
		assert_eq!(err.to_string(), "UML not found");
		assert!(matches!(err, ApiError::Http { status: 404, .. }));
	}

	#[test]
	fn other_bodies_fall_back_to_status() {
		for body in ["", "<html>", r#"{"detail":[{"loc":["body"]}]}"#] {
			assert_eq!(
				ApiError::from_response(422, body).to_string(),
				"HTTP error! status: 422"
			);
		}
	}
}
