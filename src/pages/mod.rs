pub mod home;
pub mod login;
pub mod not_found;
pub mod overview;

use leptos::prelude::*;

use crate::api::{ApiClient, ApiConfig, Session};

/// The session provided by `App`, or a fresh browser session outside it.
fn use_session() -> Session {
	use_context::<Session>().unwrap_or_else(Session::browser)
}

fn client(session: &Session) -> ApiClient {
	ApiClient::new(ApiConfig::from_env(), session.clone())
}
