//! Records exchanged with the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::diagram::{DiagramSchema, NormalizedDiagram};

/// A stored diagram record. `uml_schema` is kept raw until normalized.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProjectUml {
	/// Record id, the target of `PUT /project-uml/{id}`.
	pub id: i64,
	/// Owning project, if the backend reports one.
	#[serde(default)]
	pub project_id: Option<i64>,
	/// Diagram flavour, sent back unchanged on save.
	#[serde(rename = "type")]
	pub kind: String,
	/// The stored document, in whatever shape it was saved.
	#[serde(default)]
	pub uml_schema: Value,
}

/// Body of `PUT /project-uml/{id}`.
#[derive(Debug, Serialize)]
pub struct ProjectUmlUpdate<'a> {
	/// Project the record belongs to.
	pub project_id: Option<i64>,
	/// Diagram flavour of the record.
	#[serde(rename = "type")]
	pub kind: &'a str,
	/// Replacement document.
	pub uml_schema: &'a DiagramSchema,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
	/// Account email.
	pub email: &'a str,
	/// Plain password, sent over the API's transport.
	pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenResponse {
	#[serde(default)]
	pub access_token: Option<String>,
	#[serde(default)]
	pub detail: Option<Value>,
}

/// The signed-in account, from `GET /auth/me`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct User {
	/// Account id.
	pub id: i64,
	/// Login email.
	pub email: String,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Role such as `owner`.
	#[serde(default)]
	pub role: Option<String>,
}

impl User {
	/// Only project owners may edit diagrams.
	pub fn is_owner(&self) -> bool {
		self.role.as_deref() == Some("owner")
	}
}

/// The record being edited plus its normalized contents.
#[derive(Clone, Debug)]
pub struct LoadedDiagram {
	/// Record the diagram came from and is saved back to.
	pub record: ProjectUml,
	/// Decoded contents.
	pub diagram: NormalizedDiagram,
}
