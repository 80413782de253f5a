use log::{error, info, warn};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::config::ApiConfig;
use super::error::ApiError;
use super::models::{
	LoadedDiagram, LoginRequest, ProjectUml, ProjectUmlUpdate, TokenResponse, User,
};
use super::session::Session;
use crate::components::diagram::{DiagramSchema, normalize};

/// REST client for the backend. Every request reads the bearer token from
/// the [`Session`] it was built with.
#[derive(Clone, Debug)]
pub struct ApiClient {
	config: ApiConfig,
	http: Client,
	session: Session,
}

impl ApiClient {
	/// Client for the backend at `config`, authenticated through `session`.
	pub fn new(config: ApiConfig, session: Session) -> Self {
		Self {
			config,
			http: Client::new(),
			session,
		}
	}

	/// Session the client reads its token from.
	pub fn session(&self) -> &Session {
		&self.session
	}

	fn request(&self, method: Method, path: &str) -> RequestBuilder {
		let builder = self.http.request(method, self.config.url(path));
		match self.session.token() {
			Some(token) => builder.bearer_auth(token),
			None => builder,
		}
	}

	async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
		let response = request.send().await?;
		let status = response.status();

		if status == StatusCode::UNAUTHORIZED {
			warn!("Request rejected with 401, ending session");
			self.session.end();
			return Err(ApiError::Unauthorized);
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ApiError::from_response(status.as_u16(), &body));
		}

		response
			.json::<T>()
			.await
			.map_err(|err| ApiError::Decode(err.to_string()))
	}

	async fn put<B: Serialize, T: DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> Result<T, ApiError> {
		self.send(self.request(Method::PUT, path).json(body)).await
	}

	/// `POST /auth/login`. Starts the session on success.
	pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
		let response = self
			.http
			.post(self.config.url("/auth/login"))
			.json(&LoginRequest { email, password })
			.send()
			.await?;
		let status = response.status();
		let body = response.json::<TokenResponse>().await.unwrap_or_default();

		if !status.is_success() {
			let message = body
				.detail
				.as_ref()
				.and_then(Value::as_str)
				.unwrap_or("Login failed")
				.to_owned();
			return Err(ApiError::Http {
				status: status.as_u16(),
				message,
			});
		}

		let token = body
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or_else(|| ApiError::Decode("missing access_token".to_owned()))?;
		self.session.begin(&token);
		info!("Logged in as {email}");
		Ok(())
	}

	/// Ends the session locally. The backend keeps no logout state.
	pub fn logout(&self) {
		self.session.end();
	}

	/// `GET /auth/me`.
	pub async fn current_user(&self) -> Result<User, ApiError> {
		self.send(self.request(Method::GET, "/auth/me")).await
	}

	/// `GET /project-uml/project/{project_id}`.
	pub async fn list_project_umls(&self, project_id: i64) -> Result<Vec<ProjectUml>, ApiError> {
		self.send(self.request(Method::GET, &format!("/project-uml/project/{project_id}")))
			.await
	}

	/// `PUT /project-uml/{uml_id}`.
	pub async fn update_project_uml(
		&self,
		uml_id: i64,
		update: &ProjectUmlUpdate<'_>,
	) -> Result<ProjectUml, ApiError> {
		self.put(&format!("/project-uml/{uml_id}"), update).await
	}

	/// Fetches the project's diagram record and normalizes its schema.
	///
	/// Only the first record is used; [`ApiError::NotFound`] when there is none.
	pub async fn load_diagram(&self, project_id: i64) -> Result<LoadedDiagram, ApiError> {
		let records = self
			.list_project_umls(project_id)
			.await
			.inspect_err(|err| error!("Loading diagram for project {project_id} failed: {err}"))?;
		if records.len() > 1 {
			warn!(
				"Project {project_id} has {} diagram records, editing the first",
				records.len()
			);
		}
		let Some(record) = records.into_iter().next() else {
			info!("Project {project_id} has no diagram yet");
			return Err(ApiError::NotFound);
		};

		let diagram = normalize(&record.uml_schema);
		info!(
			"Loaded diagram {} for project {project_id}: {} nodes, {} relationships, {} rejected",
			record.id,
			diagram.nodes.len(),
			diagram.relationships.len(),
			diagram.issues.len()
		);
		Ok(LoadedDiagram { record, diagram })
	}

	/// Writes `schema` over `record` with a single `PUT`.
	pub async fn save_diagram(
		&self,
		record: &ProjectUml,
		project_id: i64,
		schema: &DiagramSchema,
	) -> Result<ProjectUml, ApiError> {
		let update = ProjectUmlUpdate {
			project_id: Some(project_id),
			kind: &record.kind,
			uml_schema: schema,
		};
		let saved = self
			.update_project_uml(record.id, &update)
			.await
			.inspect_err(|err| error!("Saving diagram {} failed: {err}", record.id))?;
		info!(
			"Saved diagram {}: {} nodes, {} relationships",
			saved.id,
			schema.nodes.len(),
			schema.relationships.len()
		);
		Ok(saved)
	}
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use serde_json::json;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;
	use crate::components::diagram::{EditorState, NodeId};

	async fn setup(token: Option<&str>) -> (MockServer, ApiClient) {
		let server = MockServer::start().await;
		let session = Session::in_memory();
		if let Some(token) = token {
			session.begin(token);
		}
		let client = ApiClient::new(ApiConfig::new(server.uri()), session);
		(server, client)
	}

	fn record(schema: Value) -> Value {
		json!({ "id": 5, "project_id": 1, "type": "system", "uml_schema": schema })
	}

	#[tokio::test]
	async fn authenticated_calls_send_the_bearer_token() {
		let (server, client) = setup(Some("secret")).await;
		Mock::given(method("GET"))
			.and(path("/auth/me"))
			.and(header("authorization", "Bearer secret"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"id": 3,
				"email": "owner@example.com",
				"role": "owner"
			})))
			.expect(1)
			.mount(&server)
			.await;

		let user = client.current_user().await.unwrap();
		assert!(user.is_owner());
		assert_eq!(user.name, None);
	}

	#[tokio::test]
	async fn error_detail_is_surfaced() {
		let (server, client) = setup(Some("secret")).await;
		Mock::given(method("GET"))
			.and(path("/project-uml/project/9"))
			.respond_with(
				ResponseTemplate::new(403).set_body_json(json!({ "detail": "Not a project member" })),
			)
			.mount(&server)
			.await;

		let err = client.load_diagram(9).await.unwrap_err();
		assert!(matches!(err, ApiError::Http { status: 403, .. }));
		assert_eq!(err.to_string(), "Not a project member");
	}

	#[tokio::test]
	async fn unauthorized_ends_the_session() {
		let (server, client) = setup(Some("stale")).await;
		Mock::given(method("GET"))
			.and(path("/auth/me"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		let err = client.current_user().await.unwrap_err();
		assert!(matches!(err, ApiError::Unauthorized));
		assert!(!client.session().is_authenticated());
	}

	#[tokio::test]
	async fn login_stores_the_token() {
		let (server, client) = setup(None).await;
		Mock::given(method("POST"))
			.and(path("/auth/login"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "fresh" })))
			.mount(&server)
			.await;

		client.login("owner@example.com", "hunter2").await.unwrap();
		assert_eq!(client.session().token().as_deref(), Some("fresh"));
	}

	#[tokio::test]
	async fn logout_drops_the_bearer_token() {
		let (server, client) = setup(Some("secret")).await;
		Mock::given(method("GET"))
			.and(path("/auth/me"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		client.logout();
		assert!(!client.session().is_authenticated());

		client.current_user().await.unwrap_err();
		let requests = server.received_requests().await.unwrap();
		assert!(requests[0].headers.get("authorization").is_none());
	}

	#[tokio::test]
	async fn failed_login_keeps_the_session_empty() {
		let (server, client) = setup(None).await;
		Mock::given(method("POST"))
			.and(path("/auth/login"))
			.respond_with(ResponseTemplate::new(400).set_body_string("not json"))
			.mount(&server)
			.await;

		let err = client.login("owner@example.com", "wrong").await.unwrap_err();
		assert_eq!(err.to_string(), "Login failed");
		assert!(!client.session().is_authenticated());
	}

	#[tokio::test]
	async fn first_record_wins() {
		let (server, client) = setup(Some("secret")).await;
		Mock::given(method("GET"))
			.and(path("/project-uml/project/1"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!([
				record(json!({ "nodes": [{ "id": "a", "type": "service" }] })),
				{ "id": 6, "project_id": 1, "type": "system", "uml_schema": {} }
			])))
			.mount(&server)
			.await;

		let loaded = client.load_diagram(1).await.unwrap();
		assert_eq!(loaded.record.id, 5);
		assert_eq!(loaded.diagram.nodes.len(), 1);
		assert_eq!((loaded.diagram.nodes[0].x, loaded.diagram.nodes[0].y), (40.0, 40.0));
	}

	#[tokio::test]
	async fn empty_project_is_not_found() {
		let (server, client) = setup(Some("secret")).await;
		Mock::given(method("GET"))
			.and(path("/project-uml/project/2"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
			.mount(&server)
			.await;

		assert!(matches!(client.load_diagram(2).await, Err(ApiError::NotFound)));
	}

	#[tokio::test]
	async fn leaving_move_mode_sends_exactly_one_put() {
		let (server, client) = setup(Some("secret")).await;
		let stored = json!({
			"nodes": [
				{ "id": "a", "name": "A", "type": "service", "x": 40, "y": 40, "w": 140, "h": 96 },
				{ "id": 2, "name": "Store", "type": "database", "x": 300, "y": 40, "w": 140, "h": 96 }
			],
			"relationships": [{ "source": "a", "to": 2, "type": "reads_writes" }]
		});
		Mock::given(method("GET"))
			.and(path("/project-uml/project/1"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!([record(stored.clone())])))
			.mount(&server)
			.await;
		Mock::given(method("PUT"))
			.and(path("/project-uml/5"))
			.respond_with(ResponseTemplate::new(200).set_body_json(record(json!({}))))
			.expect(1)
			.mount(&server)
			.await;

		let loaded = client.load_diagram(1).await.unwrap();
		let mut editor = EditorState::new(loaded.diagram, 800.0, 560.0);
		assert!(editor.toggle_move().is_none());
		assert!(editor.pointer_down(50.0, 50.0));
		for step in [100.0, 2000.0, 9999.0] {
			editor.pointer_move(step, step);
		}
		editor.pointer_up();
		let plan = editor.toggle_move().expect("leaving move mode saves");

		client.save_diagram(&loaded.record, 1, &plan).await.unwrap();

		let requests = server.received_requests().await.unwrap();
		let puts: Vec<_> = requests.iter().filter(|r| r.method.as_str() == "PUT").collect();
		assert_eq!(puts.len(), 1);

		let body: Value = puts[0].body_json().unwrap();
		assert_eq!(body["type"], "system");
		assert_eq!(body["project_id"], 1);
		let nodes = &body["uml_schema"]["nodes"];
		assert_eq!(nodes[0]["id"], "a");
		assert_eq!((nodes[0]["x"].as_f64(), nodes[0]["y"].as_f64()), (Some(660.0), Some(464.0)));
		assert_eq!(nodes[1]["id"], 2);
		assert_eq!((nodes[1]["x"].as_f64(), nodes[1]["y"].as_f64()), (Some(300.0), Some(40.0)));
		assert_eq!(body["uml_schema"]["relationships"], stored["relationships"]);
		assert!(editor.node(&NodeId::from("a")).is_some());
	}
}
