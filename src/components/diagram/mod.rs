//! System architecture diagram: stored schema, canvas view-state and drawing.

mod component;
mod render;
pub mod schema;
pub mod shapes;
pub mod state;
pub mod types;

pub use component::DiagramCanvas;
pub use schema::{DecodeIssue, NormalizedDiagram, normalize};
pub use state::{EditorState, NodeDraft, RelationshipDraft, ValidationError};
pub use types::{DiagramNode, DiagramRelationship, DiagramSchema, NodeId, NodeKind};
