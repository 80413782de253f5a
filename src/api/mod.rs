//! Backend access: configuration, the login session and the REST client.

mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::ApiError;
pub use models::{LoadedDiagram, ProjectUml, User};
pub use session::Session;
